pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version_line() -> String {
    format!(
        "bbl {} ({}/{})",
        VERSION,
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

pub fn handle() -> anyhow::Result<()> {
    println!("{}", version_line());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_line() {
        let line = version_line();
        assert!(line.starts_with(&format!("bbl {} (", VERSION)));
        assert!(line.ends_with(')'));
    }
}
