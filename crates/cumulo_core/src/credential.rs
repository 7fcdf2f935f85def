/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use rand::{rngs::OsRng, thread_rng, Rng, RngCore};
use sha2::{Digest, Sha256};

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SALT_LEN: usize = 16;

/// Random ASCII letters, used for generated tokens such as `secret_key`.
pub fn random_letters(len: usize) -> String {
    let mut rng = thread_rng();
    (0..len)
        .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
        .collect()
}

/// Derives the stored credential for `plain`: `salt:sha256_hex(plain + salt)`.
pub fn derive_password(plain: &str) -> Result<String> {
    let mut raw = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut raw)
        .context("read salt from os rng")?;
    let salt: String = raw
        .iter()
        .map(|b| LETTERS[*b as usize % LETTERS.len()] as char)
        .collect();
    Ok(format!("{salt}:{}", digest(plain, &salt)))
}

pub fn verify_password(stored: &str, plain: &str) -> bool {
    let Some((salt, expected)) = stored.split_once(':') else {
        return false;
    };
    if salt.is_empty() || expected.is_empty() {
        return false;
    }
    digest(plain, salt) == expected
}

fn digest(plain: &str, salt: &str) -> String {
    let mut h = Sha256::new();
    h.update(plain.as_bytes());
    h.update(salt.as_bytes());
    hex::encode(h.finalize())
}
