//! Issue a license for this machine and verify it.
//!
//! # Running
//!
//! ```bash
//! export KEYLOCK_SECRET="your-signing-secret"
//! cargo run --example issue_and_check
//! ```
//!
//! # Note
//!
//! The secret is the only thing standing between users and self-issued
//! licenses. Load it from deployment configuration; never commit it.

use keylock::crypto::fingerprint::ComponentFingerprint;
use keylock::{
    expiry_in, AuthorityConfig, Clock, HardwareFingerprint, LicenseAuthority, LicensePayload,
    SystemClock,
};

fn main() {
    let authority = match AuthorityConfig::from_env().and_then(LicenseAuthority::new) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Real applications collect MAC address, CPU and similar identifiers.
    let fingerprint = ComponentFingerprint::new(&[std::env::consts::OS, std::env::consts::ARCH]);
    let hwid = fingerprint.hardware_id();

    let clock = SystemClock;
    let expiry = match expiry_in(30, &clock) {
        Ok(date) => date,
        Err(e) => {
            eprintln!("Cannot compute expiry: {}", e);
            std::process::exit(1);
        }
    };
    let payload = LicensePayload::new("demo_product", expiry, 5, hwid.clone());

    println!("Generating license for product '{}'", payload.product);
    println!("  Hardware ID: {}", hwid);
    println!("  Expires on:  {}", expiry);

    let token = authority.issue(&payload);
    println!("\nLicense key:\n{}\n", token);

    let result = authority.check_current(&token, &clock, &fingerprint);
    if result.valid {
        println!("✓ {} ({} day(s) left)", result.reason, result.days_left);
    } else {
        println!("✗ {}", result.reason);
    }

    println!("\nBatch example (3 sample HWIDs):");
    let hwids: Vec<String> = (1..=3).map(|i| format!("HWID_{:03}", i)).collect();
    for record in authority.issue_batch("demo_product", clock.today(), 5, &hwids) {
        println!("  {} -> {}", record.hwid, record.license);
    }
}
