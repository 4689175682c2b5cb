//! Prints an Argon2id PHC string for seeding `users.password_hash`.
//!
//! $ cargo run --bin hash_password -- --password 'correct horse battery staple'

use clap::Parser;
use dealflow::application_impl::Argon2PasswordHasher;
use dealflow::application_port::CredentialHasher;
use std::io::BufRead;

#[derive(Parser, Debug)]
struct Args {
    /// Plaintext password. Read from the first line of stdin when omitted.
    #[arg(long)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let password = match args.password {
        Some(password) => password,
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    anyhow::ensure!(!password.is_empty(), "password must not be empty");

    let hash = Argon2PasswordHasher::try_new()?
        .hash_password(&password)
        .await?;
    println!("{hash}");

    Ok(())
}
