use anyhow::{Context, Result, bail};
use std::io::{self, BufRead, IsTerminal, Read};
use zeroize::Zeroizing;

use keycrypt::strength;

const PASSPHRASE_ENV: &str = "KEYCRYPT_PASSPHRASE";

pub fn read_passphrase() -> Result<Zeroizing<Vec<u8>>> {
    read_passphrase_with_prompt("Enter passphrase: ")
}

fn read_passphrase_with_prompt(prompt: &str) -> Result<Zeroizing<Vec<u8>>> {
    //  Environment Variable
    //  KEYCRYPT_PASSPHRASE="supersecret" keycrypt decrypt --file secret.json
    if let Some(pw) = std::env::var_os(PASSPHRASE_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw.into_encoded_bytes()));
        }
    }

    //  stdin (Pipeline)
    //  printf "%s\n%s\n" "$SECRET" "$PASSPHRASE" | keycrypt encrypt --file secret
    if !io::stdin().is_terminal() {
        let line = read_line()?;
        if !line.is_empty() {
            return Ok(line);
        }
        bail!("passphrase cannot be empty");
    }

    //  Interactive (TTY)
    let pw = Zeroizing::new(rpassword::prompt_password(prompt)?);
    if pw.is_empty() {
        bail!("passphrase cannot be empty");
    }
    Ok(Zeroizing::new(pw.as_bytes().to_vec()))
}

/// Reads the passphrase twice, printing the strength advisory in between.
pub fn read_new_passphrase_with_confirmation() -> Result<Zeroizing<Vec<u8>>> {
    let pw1 = read_passphrase()?;
    eprintln!("{}", strength::estimate(&pw1));
    let pw2 = read_passphrase_with_prompt("Confirm passphrase: ")?;

    if pw1 != pw2 {
        bail!("passphrases do not match");
    }

    Ok(pw1)
}

/// Reads the secret as one line of raw bytes, trimming surrounding ASCII
/// whitespace.
pub fn read_secret() -> Result<Zeroizing<Vec<u8>>> {
    if io::stdin().is_terminal() {
        eprint!("Enter secret: ");
    }
    let line = read_line()?;
    let secret = line.trim_ascii();
    if secret.is_empty() {
        bail!("secret cannot be empty");
    }
    Ok(Zeroizing::new(secret.to_vec()))
}

/// Reads all of stdin as raw bytes.
pub fn read_stdin_all() -> Result<Zeroizing<Vec<u8>>> {
    let mut buf = Zeroizing::new(Vec::new());
    io::stdin()
        .read_to_end(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

/// Reads one line of raw bytes; the content need not be UTF-8.
fn read_line() -> Result<Zeroizing<Vec<u8>>> {
    let mut line = Zeroizing::new(Vec::new());
    io::stdin()
        .lock()
        .read_until(b'\n', &mut line)
        .context("failed to read stdin")?;
    trim_newline(&mut line);
    Ok(line)
}

fn trim_newline(line: &mut Vec<u8>) {
    while matches!(line.last(), Some(b'\n' | b'\r')) {
        line.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_newline_strips_line_endings_only() {
        let mut line = b" pass phrase \r\n".to_vec();
        trim_newline(&mut line);
        assert_eq!(line, b" pass phrase ");
    }

    #[test]
    fn trim_newline_keeps_non_utf8_bytes() {
        let mut line = vec![0xff, 0xfe, b'A', b'\n'];
        trim_newline(&mut line);
        assert_eq!(line, [0xff, 0xfe, b'A']);
    }
}
