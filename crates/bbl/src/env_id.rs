//! Environment names

use anyhow::bail;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z](?:[a-z0-9-]*[a-z0-9])?$").expect("valid name pattern"));

const LAKES: &[&str] = &[
    "alpine", "baikal", "caspian", "como", "constance", "crater", "erie", "garda", "geneva",
    "huron", "ladoga", "lucerne", "malawi", "mead", "michigan", "ness", "ohrid", "onega",
    "ontario", "powell", "superior", "tahoe", "tana", "titicaca", "toba", "victoria", "volta",
    "winnipeg",
];

/// `bbl-env-<lake>-<timestamp>`
pub fn generate(now: DateTime<Utc>) -> String {
    let seed = uuid::Uuid::new_v4().as_bytes()[0] as usize;
    let lake = LAKES[seed % LAKES.len()];
    format!("bbl-env-{}-{}", lake, now.format("%Y-%m-%dt%H-%Mz"))
}

pub fn validate(name: &str) -> anyhow::Result<()> {
    if !NAME.is_match(name) {
        bail!("Names must start with a letter and be alphanumeric or hyphenated.");
    }
    Ok(())
}

/// Pick the env id for `bbl up`, keeping an existing one stable
pub fn resolve(current: &str, requested: Option<&str>) -> anyhow::Result<String> {
    let requested = requested.filter(|name| !name.is_empty());

    match (current.is_empty(), requested) {
        (false, Some(name)) if name != current => bail!(
            "The director name cannot be changed for an existing environment. Current name is {}.",
            current
        ),
        (false, _) => Ok(current.to_string()),
        (true, Some(name)) => {
            validate(name)?;
            Ok(name.to_string())
        }
        (true, None) => Ok(generate(Utc::now())),
    }
}
