use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::*;

macro_rules! cargo_run {
    ($cmd:expr, $($args:expr),*) => {
        {
            let mut cmd = Command::cargo_bin($cmd)?;
            cmd.env_remove("VPMATCH_DATABASE");
            $(cmd.arg($args);)*
            cmd.assert()
        }
    };
}

#[rstest]
#[case::server("server", "--min-score")]
#[case::seed("seed", "--category")]
#[case::show("show", "--output-format")]
fn subcommand_help(#[case] subcmd: &str, #[case] flag: &str) -> Result<()> {
    cargo_run!("vpmatch", subcmd, "--help").success().stdout(predicate::str::contains(flag));
    Ok(())
}

#[test]
fn show_empty_database() -> Result<()> {
    let conf_dir = assert_fs::TempDir::new()?;

    cargo_run!("vpmatch", "-c", conf_dir.path(), "show", "--output-format", "json")
        .success()
        .stdout(predicate::str::contains(r#""catalog": []"#))
        .stdout(predicate::str::contains(r#""uploaded": []"#));

    cargo_run!("vpmatch", "-c", conf_dir.path(), "show")
        .success()
        .stdout(predicate::str::contains("catalog\t0"));

    assert!(conf_dir.path().join("vpmatch.db").is_file());
    Ok(())
}

#[test]
fn seed_requires_directory() -> Result<()> {
    let conf_dir = assert_fs::TempDir::new()?;
    let missing = conf_dir.path().join("missing");

    cargo_run!(
        "vpmatch",
        "-c",
        conf_dir.path(),
        "seed",
        "--bucket",
        "products",
        "--clarifai-api-key",
        "key",
        missing
    )
    .failure()
    .stderr(predicate::str::contains("不是目录"));
    Ok(())
}
