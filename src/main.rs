use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
mod auth;
use keycrypt::mnemonic::{self, Direction};
use keycrypt::{
    EncryptOptions, KdfParams, Pbkdf2Params, ScryptParams, Storage, decrypt_from_storage,
    encrypt_to_storage,
};
use std::io::Write;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KdfKind {
    Scrypt,
    Pbkdf2,
}

#[derive(Debug, clap::Args)]
struct KdfArgs {
    /// Key derivation function for new keystores
    #[arg(long, value_enum, default_value = "scrypt", env = "KEYCRYPT_KDF")]
    kdf: KdfKind,

    /// scrypt cost parameter N, a power of two (default: 262144)
    #[arg(long = "scrypt-n", env = "KEYCRYPT_SCRYPT_N")]
    scrypt_n: Option<u32>,

    /// scrypt block size r (default: 8)
    #[arg(long = "scrypt-r", env = "KEYCRYPT_SCRYPT_R")]
    scrypt_r: Option<u32>,

    /// scrypt parallelism p (default: 1)
    #[arg(long = "scrypt-p", env = "KEYCRYPT_SCRYPT_P")]
    scrypt_p: Option<u32>,

    /// PBKDF2 iteration count (default: 262144)
    #[arg(long = "pbkdf2-c", env = "KEYCRYPT_PBKDF2_C")]
    pbkdf2_c: Option<u32>,
}

impl KdfArgs {
    fn to_kdf_params(&self) -> Result<KdfParams> {
        let params = match self.kdf {
            KdfKind::Scrypt => {
                let default = ScryptParams::default();
                KdfParams::Scrypt(ScryptParams::new(
                    self.scrypt_n.unwrap_or(default.n()),
                    self.scrypt_r.unwrap_or(default.r()),
                    self.scrypt_p.unwrap_or(default.p()),
                )?)
            }
            KdfKind::Pbkdf2 => {
                let default = Pbkdf2Params::default();
                KdfParams::Pbkdf2(Pbkdf2Params::new(self.pbkdf2_c.unwrap_or(default.c()))?)
            }
        };
        Ok(params)
    }
}

fn parse_pad(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err("pad must be a single ASCII character".to_string()),
    }
}

#[derive(Debug, Parser)]
#[command(name = "keycrypt")]
#[command(
    version,
    about = "Passphrase-encrypted keystore files and BIP-39 mnemonic backups for secrets."
)]
struct Cli {
    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn", env = "KEYCRYPT_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts a secret read from stdin into a new keystore file
    Encrypt {
        /// Keystore file to create; `.json` is appended if missing
        #[arg(long, value_name = "PATH")]
        file: PathBuf,

        #[command(flatten)]
        kdf: KdfArgs,

        /// Write a full EIP-2335 document instead of the bare crypto object
        #[arg(long, default_value_t = false)]
        envelope: bool,

        /// Description stored in the envelope; ignored without --envelope
        #[arg(long)]
        description: Option<String>,
    },

    /// Decrypts a keystore file and prints the secret
    Decrypt {
        #[arg(long, value_name = "PATH")]
        file: PathBuf,
    },

    /// Converts stdin between raw bytes and 24-word mnemonic phrases
    Mnemonic {
        /// Byte used to pad the last 32-byte block
        #[arg(long, default_value = " ", value_parser = parse_pad, env = "KEYCRYPT_PAD")]
        pad: u8,
    },
}

fn init_tracing(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level);

    match args.command {
        Commands::Encrypt {
            file,
            kdf,
            envelope,
            description,
        } => {
            let options = EncryptOptions {
                kdf: kdf.to_kdf_params()?,
                envelope,
                description,
            };
            let storage = Storage::with_json_extension(file);
            if storage.exists() {
                bail!("file {} already exists", storage.path().display());
            }

            let secret = auth::read_secret()?;
            let passphrase = auth::read_new_passphrase_with_confirmation()?;
            eprintln!(
                "Secret length: {}, passphrase length: {}",
                secret.len(),
                passphrase.len()
            );
            eprintln!("Writing encrypted secret to {}", storage.path().display());

            encrypt_to_storage(&storage, &secret, &passphrase, &options)?;
        }
        Commands::Decrypt { file } => {
            let storage = Storage::new(file);
            let passphrase = auth::read_passphrase()?;
            let secret = decrypt_from_storage(&storage, &passphrase)?;

            let mut out = std::io::stdout().lock();
            writeln!(out, "Decrypted secret:")?;
            out.write_all(&secret)?;
            writeln!(out)?;
        }
        Commands::Mnemonic { pad } => {
            let input = auth::read_stdin_all()?;
            if input.is_empty() {
                bail!("no input on stdin");
            }

            let (direction, output) = mnemonic::convert(&input, pad)?;
            tracing::debug!(
                decoded = matches!(direction, Direction::Decoded),
                bytes = output.len(),
                "converted stdin"
            );

            let mut out = std::io::stdout().lock();
            out.write_all(&output)?;
            out.flush()?;
        }
    }

    Ok(())
}
