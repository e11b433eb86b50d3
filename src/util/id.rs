//! ID generation for issues.
//!
//! Format: `<TEAM>-<hash>` where hash is base36 lowercase (0-9, a-z) with
//! adaptive length based on how many issues the team already has.

use chrono::{DateTime, Utc};
use issue_store::StoreError;
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};

/// ID generation configuration.
#[derive(Debug, Clone)]
pub struct IdConfig {
    /// Team key used as the ID prefix (e.g., "ENG").
    pub team: String,
    /// Minimum hash length.
    pub min_hash_length: usize,
    /// Maximum hash length.
    pub max_hash_length: usize,
    /// Maximum collision probability before increasing length.
    pub max_collision_prob: f64,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            team: "ENG".to_string(),
            min_hash_length: 3,
            max_hash_length: 8,
            max_collision_prob: 0.25,
        }
    }
}

impl IdConfig {
    #[must_use]
    pub fn with_team(team: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            ..Default::default()
        }
    }
}

/// ID generator that produces unique issue IDs.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    config: IdConfig,
}

impl IdGenerator {
    #[must_use]
    pub const fn new(config: IdConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn for_team(team: impl Into<String>) -> Self {
        Self::new(IdConfig::with_team(team))
    }

    /// Compute the optimal hash length for a given issue count.
    ///
    /// Uses birthday problem approximation to estimate collision probability.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap
    )]
    pub fn optimal_length(&self, issue_count: usize) -> usize {
        let n = issue_count as f64;
        let max_prob = self.config.max_collision_prob;

        for len in self.config.min_hash_length..=self.config.max_hash_length {
            // Base36 has 36^len possible values
            let space = 36_f64.powi(len as i32);
            // Birthday problem: P(collision) ≈ 1 - e^(-n²/2d)
            let prob = 1.0 - (-n * n / (2.0 * space)).exp();
            if prob < max_prob {
                return len;
            }
        }
        self.config.max_hash_length
    }

    #[must_use]
    pub fn generate_candidate(
        &self,
        title: &str,
        created_at: DateTime<Utc>,
        nonce: u32,
        hash_length: usize,
    ) -> String {
        let seed = generate_id_seed(&self.config.team, title, created_at, nonce);
        let hash_str = compute_id_hash(&seed, hash_length);
        format!("{}-{hash_str}", self.config.team)
    }

    /// Generate an ID, checking for collisions with the provided checker.
    ///
    /// The checker function should return `true` if the ID already exists.
    pub fn generate<F>(
        &self,
        title: &str,
        created_at: DateTime<Utc>,
        issue_count: usize,
        exists: F,
    ) -> String
    where
        F: Fn(&str) -> bool,
    {
        let mut length = self.optimal_length(issue_count);

        loop {
            // Try nonces 0..10 at this length
            for nonce in 0..10 {
                let id = self.generate_candidate(title, created_at, nonce, length);
                if !exists(&id) {
                    return id;
                }
            }

            // All nonces collided, increase length
            if length < self.config.max_hash_length {
                length += 1;
            } else {
                let seed = generate_id_seed(&self.config.team, title, created_at, 0);
                return format!("{}-{}", self.config.team, compute_id_hash(&seed, 12));
            }
        }
    }
}

/// Seed string for ID generation: `team | title | created_at (ns) | nonce`.
#[must_use]
pub fn generate_id_seed(team: &str, title: &str, created_at: DateTime<Utc>, nonce: u32) -> String {
    format!(
        "{}|{}|{}|{}",
        team,
        title,
        created_at.timestamp_nanos_opt().unwrap_or(0),
        nonce
    )
}

/// Compute a base36 hash of the input string with a specific length.
///
/// Uses SHA256 to hash the input, then converts the first 8 bytes to a u64,
/// encodes as base36, and truncates to the requested length.
#[must_use]
pub fn compute_id_hash(input: &str, length: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();

    let mut num = 0u64;
    for &byte in result.iter().take(8) {
        num = (num << 8) | u64::from(byte);
    }

    let mut s = base36_encode(num);
    if s.len() < length {
        s = format!("{s:0>length$}");
    }
    s.chars().take(length).collect()
}

#[allow(clippy::cast_possible_truncation)]
fn base36_encode(mut num: u64) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if num == 0 {
        return "0".to_string();
    }
    let mut chars = Vec::new();
    while num > 0 {
        chars.push(ALPHABET[(num % 36) as usize] as char);
        num /= 36;
    }
    chars.into_iter().rev().collect()
}

/// Resolve user input to a full issue id.
///
/// Accepts the exact id, the id in any letter case, the bare hash without
/// the team prefix, or a unique prefix of any of those.
///
/// # Errors
///
/// Returns `IssueNotFound` when nothing matches and `AmbiguousId` when a
/// prefix matches several issues.
pub fn resolve_id(input: &str, ids: &[String]) -> Result<String> {
    let needle = input.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Err(StoreError::not_found(input).into());
    }
    if let Some(exact) = ids.iter().find(|id| id.to_ascii_lowercase() == needle) {
        return Ok(exact.clone());
    }

    let mut matches: Vec<String> = ids
        .iter()
        .filter(|id| {
            let lower = id.to_ascii_lowercase();
            let hash = lower.split_once('-').map_or(lower.as_str(), |(_, h)| h);
            lower.starts_with(&needle) || hash.starts_with(&needle)
        })
        .cloned()
        .collect();

    match matches.len() {
        0 => Err(StoreError::not_found(input).into()),
        1 => Ok(matches.remove(0)),
        _ => {
            matches.sort();
            Err(AppError::AmbiguousId {
                partial: input.to_string(),
                matches,
            })
        }
    }
}
