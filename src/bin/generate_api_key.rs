//! CLI tool to generate API keys for the API_KEYS allow-list.
//!
//! Usage:
//!   cargo run --bin generate-api-key -- --count 2 --length 40

use std::env;

use rand::RngExt;

const DEFAULT_LENGTH: usize = 32;
const MIN_LENGTH: usize = 16;
const KEY_PREFIX: &str = "kg_";

/// Base62 alphabet: digits + uppercase + lowercase, no separators that
/// would clash with the comma-separated API_KEYS format.
const BASE62_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let mut length = DEFAULT_LENGTH;
    let mut count = 1usize;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--length" | "-l" => {
                i += 1;
                match args.get(i).and_then(|v| v.parse::<usize>().ok()) {
                    Some(n) if n >= MIN_LENGTH => length = n,
                    _ => {
                        eprintln!("Error: --length must be a number >= {}", MIN_LENGTH);
                        std::process::exit(1);
                    }
                }
            }
            "--count" | "-c" => {
                i += 1;
                match args.get(i).and_then(|v| v.parse::<usize>().ok()) {
                    Some(n) if n >= 1 => count = n,
                    _ => {
                        eprintln!("Error: --count must be a number >= 1");
                        std::process::exit(1);
                    }
                }
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let keys: Vec<String> = (0..count).map(|_| generate_key(length)).collect();

    for key in &keys {
        println!("{}", key);
    }
    eprintln!();
    eprintln!("Add to your environment (comma-separated):");
    eprintln!("  API_KEYS={}", keys.join(","));
}

/// Generate a random alphanumeric key with the keygate prefix.
/// Uses `rand::rng()`, which is backed by a CSPRNG.
fn generate_key(length: usize) -> String {
    let mut rng = rand::rng();
    let random_part: String = (0..length)
        .map(|_| {
            let idx = rng.random_range(0..BASE62_CHARS.len());
            BASE62_CHARS[idx] as char
        })
        .collect();
    format!("{}{}", KEY_PREFIX, random_part)
}

fn print_usage() {
    eprintln!("Generate API keys for the keygate server");
    eprintln!();
    eprintln!("Usage: generate-api-key [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -l, --length <N>   Random part length (default: {})", DEFAULT_LENGTH);
    eprintln!("  -c, --count <N>    Number of keys to generate (default: 1)");
    eprintln!("  -h, --help         Show this help");
}
