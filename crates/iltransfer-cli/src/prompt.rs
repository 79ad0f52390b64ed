use colored::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

pub fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let stdin = io::stdin();
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if stdin.lock().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}

/// Ask for a directory until an existing one is given. Empty input picks `default`.
pub fn prompt_dir(prompt: &str, default: &Path) -> io::Result<PathBuf> {
    let stdin = io::stdin();
    let mut input = String::new();

    loop {
        input.clear();
        print!(
            "{} {}: ",
            prompt.green(),
            format!("(default: {})", default.display()).dimmed()
        );
        io::stdout().flush()?;

        if stdin.lock().read_line(&mut input)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no more input while asking for a path",
            ));
        }

        let path = match input.trim() {
            "" => default.to_path_buf(),
            entered => PathBuf::from(entered),
        };

        if path.is_dir() {
            return Ok(path.canonicalize().unwrap_or(path));
        }

        println!("Invalid path. Please enter a valid directory.");
    }
}
