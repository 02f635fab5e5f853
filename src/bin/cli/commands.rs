//! Implementations of the CLI commands.

use std::path::Path;

use varc::{AddOptions, Archive, Error, ExtractOptions, ListOptions, Password};

use crate::exit_codes::{self, FAILURE, SUCCESS};
use crate::password;
use crate::progress::Reporter;
use crate::GlobalOpts;

/// Opens an archive, prompting once for a password if the file turns out
/// to be encrypted and none was given.
fn open_archive(path: &Path, opts: &GlobalOpts) -> Result<Archive, Error> {
    let provided = opts
        .password
        .as_ref()
        .map(|p| Password::new(p.clone()));

    let mut archive = Archive::new();
    match archive.open(path, provided.as_ref()) {
        Ok(()) => Ok(archive),
        Err(Error::PasswordRequired) => {
            let prompted = password::get_password(&None).ok_or(Error::PasswordRequired)?;
            let mut archive = Archive::new();
            archive.open(path, Some(&prompted))?;
            Ok(archive)
        }
        Err(e) => Err(e),
    }
}

fn add_options(opts: &GlobalOpts, password: Option<Password>) -> AddOptions {
    let mut add = AddOptions::new().compress(opts.compress).level(opts.level);
    add.encrypt = opts.encrypt;
    add.password = password;
    add
}

pub fn create(archive_path: &Path, inputs: &[std::path::PathBuf], opts: &GlobalOpts) -> i32 {
    let password = if opts.encrypt {
        match password::get_password_confirmed(&opts.password) {
            Some(p) => Some(p),
            None => {
                eprintln!("Error: encryption requires a password");
                return FAILURE;
            }
        }
    } else {
        opts.password.as_ref().map(|p| Password::new(p.clone()))
    };

    let mut archive = Archive::new();
    if let Err(e) = archive.create(archive_path) {
        eprintln!("Error: failed to create archive: {e}");
        return FAILURE;
    }

    let reporter = Reporter::new(opts.quiet);
    archive.set_progress_callback(reporter.callback());

    let result = match archive.add_paths(inputs, &add_options(opts, password)) {
        Ok(result) => result,
        Err(e) => {
            reporter.finish();
            eprintln!("Error: {e}");
            return FAILURE;
        }
    };
    if let Err(e) = archive.save(None) {
        reporter.finish();
        eprintln!("Error: failed to save archive: {e}");
        return FAILURE;
    }
    reporter.finish();

    println!("Created: {}", archive_path.display());
    println!("Files: {}", result.files_added);
    println!(
        "Size: {:.2} KB",
        result.bytes_added as f64 / 1024.0
    );
    for skipped in &result.skipped {
        eprintln!("Warning: skipped duplicate '{skipped}'");
    }
    if opts.compress && opts.level > 0 {
        println!(
            "Compression: {} (level {})",
            varc::compress::level_name(opts.level),
            opts.level
        );
    }
    if opts.encrypt {
        println!("Encryption: AES-256-CBC");
    }
    SUCCESS
}

pub fn extract(archive_path: &Path, output_dir: Option<&Path>, opts: &GlobalOpts) -> i32 {
    let output_dir = output_dir.unwrap_or_else(|| Path::new("."));

    let mut archive = match open_archive(archive_path, opts) {
        Ok(archive) => archive,
        Err(e) => {
            eprintln!("Error: failed to open archive: {e}");
            return FAILURE;
        }
    };

    let reporter = Reporter::new(opts.quiet);
    archive.set_progress_callback(reporter.callback());

    let options = ExtractOptions::new().overwrite(opts.overwrite);
    let result = match archive.extract_all(output_dir, None, &options) {
        Ok(result) => result,
        Err(e) => {
            reporter.finish();
            eprintln!("Error: {e}");
            return FAILURE;
        }
    };
    reporter.finish();

    println!("Extracted: {} files", result.files_processed);
    println!("Output: {}", output_dir.display());
    if !result.failures.is_empty() {
        for failure in &result.failures {
            eprintln!("Warning: could not write '{failure}'");
        }
        return FAILURE;
    }
    SUCCESS
}

pub fn list(archive_path: &Path, opts: &GlobalOpts) -> i32 {
    let archive = match open_archive(archive_path, opts) {
        Ok(archive) => archive,
        Err(e) => {
            eprintln!("Error: failed to open archive: {e}");
            return FAILURE;
        }
    };

    let mut options = if opts.raw {
        ListOptions::raw()
    } else {
        ListOptions::default()
    };
    options.show_checksums = opts.checksums;

    print!("{}", archive.list(&options));
    SUCCESS
}

pub fn verify(archive_path: &Path, opts: &GlobalOpts) -> i32 {
    let mut archive = match open_archive(archive_path, opts) {
        Ok(archive) => archive,
        Err(e) => {
            eprintln!("Error: failed to open archive: {e}");
            return FAILURE;
        }
    };

    print!("{}", archive.verification_report());
    println!();

    let reporter = Reporter::new(opts.quiet);
    archive.set_progress_callback(reporter.callback());
    match archive.verify(None) {
        Ok(()) => {
            reporter.finish();
            println!("Status: VERIFIED");
            SUCCESS
        }
        Err(e) => {
            reporter.finish();
            println!("Status: FAILED");
            eprintln!("Error: {e}");
            exit_codes::verification_exit_code(&e)
        }
    }
}

pub fn add(archive_path: &Path, inputs: &[std::path::PathBuf], opts: &GlobalOpts) -> i32 {
    let mut archive = match open_archive(archive_path, opts) {
        Ok(archive) => archive,
        Err(e) => {
            eprintln!("Error: failed to open archive: {e}");
            return FAILURE;
        }
    };

    let reporter = Reporter::new(opts.quiet);
    archive.set_progress_callback(reporter.callback());

    let password = opts.password.as_ref().map(|p| Password::new(p.clone()));
    let result = match archive.add_paths(inputs, &add_options(opts, password)) {
        Ok(result) => result,
        Err(e) => {
            reporter.finish();
            eprintln!("Error: {e}");
            return FAILURE;
        }
    };
    if let Err(e) = archive.save(None) {
        reporter.finish();
        eprintln!("Error: failed to save archive: {e}");
        return FAILURE;
    }
    reporter.finish();

    println!("Added {} files to archive", result.files_added);
    for skipped in &result.skipped {
        eprintln!("Warning: skipped duplicate '{skipped}'");
    }
    SUCCESS
}

pub fn remove(archive_path: &Path, patterns: &[String], opts: &GlobalOpts) -> i32 {
    let mut archive = match open_archive(archive_path, opts) {
        Ok(archive) => archive,
        Err(e) => {
            eprintln!("Error: failed to open archive: {e}");
            return FAILURE;
        }
    };

    let mut removed = 0u64;
    for pattern in patterns {
        match archive.remove_pattern(pattern) {
            Ok(count) => removed += count,
            Err(e) => {
                eprintln!("Error: {e}");
                return FAILURE;
            }
        }
    }
    if let Err(e) = archive.save(None) {
        eprintln!("Error: failed to save archive: {e}");
        return FAILURE;
    }

    println!("Removed {removed} entries from archive");
    SUCCESS
}

pub fn lock(archive_path: &Path, opts: &GlobalOpts) -> i32 {
    let Some(password) = password::get_password_confirmed(&opts.password) else {
        eprintln!("Error: lock requires a password");
        return FAILURE;
    };

    let mut archive = Archive::new();
    if let Err(e) = archive.open(archive_path, None) {
        eprintln!("Error: failed to open archive: {e}");
        return FAILURE;
    }
    if let Err(e) = archive.lock(&password) {
        eprintln!("Error: failed to lock archive: {e}");
        return FAILURE;
    }
    if let Err(e) = archive.save(None) {
        eprintln!("Error: failed to save archive: {e}");
        return FAILURE;
    }

    println!("Archive locked successfully");
    SUCCESS
}

pub fn unlock(archive_path: &Path, opts: &GlobalOpts) -> i32 {
    let Some(password) = password::get_password(&opts.password) else {
        eprintln!("Error: unlock requires a password");
        return FAILURE;
    };

    let mut archive = Archive::new();
    if let Err(e) = archive.open(archive_path, Some(&password)) {
        eprintln!("Error: failed to open archive: {e}");
        return FAILURE;
    }
    if let Err(e) = archive.unlock(&password) {
        eprintln!("Error: failed to unlock archive: {e}");
        return FAILURE;
    }
    if let Err(e) = archive.save(None) {
        eprintln!("Error: failed to save archive: {e}");
        return FAILURE;
    }

    println!("Archive unlocked successfully");
    SUCCESS
}
