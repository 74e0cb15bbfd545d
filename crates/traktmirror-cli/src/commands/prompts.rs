use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::io::{self, Write};

/// Read a line from stdin; an empty answer yields `default`
pub fn prompt_string(prompt: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) if !d.is_empty() => print!("{} [{}]: ", prompt, d),
        _ => print!("{}: ", prompt),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|e| eyre!("Failed to read input: {}", e))?;
    let input = input.trim();

    if input.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(input.to_string())
    }
}

/// Read a secret without echo
pub fn prompt_secret(prompt: &str) -> Result<String> {
    let value = rpassword::prompt_password(format!("{}: ", prompt))
        .map_err(|e| eyre!("Failed to read {}: {}", prompt, e))?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(eyre!("{} cannot be empty", prompt));
    }
    Ok(value)
}

/// Flag value if given, otherwise ask
pub fn value_or_prompt(value: Option<String>, prompt: &str, current: Option<&str>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => prompt_string(prompt, current),
    }
}
