// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_default_currency, http_client};
use anyhow::{anyhow, Result};
use tracing::warn;

pub fn handle(conn: &rusqlite::Connection, m: &clap::ArgMatches) -> Result<()> {
    let attempts: usize = *m.get_one::<usize>("attempts").unwrap_or(&3);
    let base = get_default_currency(conn)?;
    let url = format!("https://api.frankfurter.dev/latest?from={}", base);
    let client = http_client()?;

    let mut ok = 0usize;
    for i in 1..=attempts {
        let started = std::time::Instant::now();
        match client.get(&url).send().and_then(|r| r.error_for_status()) {
            Ok(_) => {
                ok += 1;
                println!("attempt {}: ok ({} ms)", i, started.elapsed().as_millis());
            }
            Err(err) => {
                warn!("rate service attempt {} failed: {}", i, err);
                println!("attempt {}: failed ({})", i, err);
            }
        }
    }
    if ok == 0 {
        return Err(anyhow!("Rate service unreachable after {} attempts", attempts));
    }
    println!("{}/{} attempts succeeded", ok, attempts);
    Ok(())
}
