use crate::cli::LintArgs;
use color_eyre::eyre::{eyre, Result};
use duct::cmd;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// One cargo invocation in the lint pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    args: Vec<&'static str>,
}

impl Step {
    fn new(args: &[&'static str]) -> Self {
        Self {
            args: args.to_vec(),
        }
    }

    fn name(&self) -> String {
        format!("cargo {}", self.args.join(" "))
    }
}

/// Builds the ordered list of steps for `args`. Pure; nothing is executed here.
fn pipeline(args: &LintArgs) -> Vec<Step> {
    let mut steps = Vec::new();

    if !args.no_fmt {
        steps.push(if args.fix {
            Step::new(&["fmt", "--all"])
        } else {
            Step::new(&["fmt", "--all", "--check"])
        });
    }

    if !args.no_clippy {
        steps.push(if args.fix {
            Step::new(&[
                "clippy",
                "--workspace",
                "--all-targets",
                "--fix",
                "--allow-dirty",
                "--",
                "-D",
                "warnings",
            ])
        } else {
            Step::new(&[
                "clippy",
                "--workspace",
                "--all-targets",
                "--",
                "-D",
                "warnings",
            ])
        });
    }

    if !args.no_test {
        steps.push(Step::new(&["test", "--workspace"]));
    }

    steps
}

fn log_entry(name: &str, output: &str) -> String {
    format!("=== {name} ===\n{output}\n")
}

/// Runs every step in order and stops at the first failure.
pub fn run(args: &LintArgs) -> Result<()> {
    let log_path = log_path()?;
    let mut log_file = fs::File::create(&log_path)?;

    for step in pipeline(args) {
        let name = step.name();
        println!("==> {name}");

        let output = cmd("cargo", &step.args)
            .stderr_to_stdout()
            .stdout_capture()
            .unchecked()
            .run()?;
        let text = String::from_utf8_lossy(&output.stdout);

        write!(log_file, "{}", log_entry(&name, &text))?;

        if !output.status.success() {
            print!("{text}");
            println!("log: {}", log_path.display());
            return Err(eyre!("lint failed at: {name}"));
        }

        if args.verbose {
            print!("{text}");
        }
    }

    println!("log: {}", log_path.display());
    Ok(())
}

fn log_path() -> Result<PathBuf> {
    let target_dir = std::env::current_dir()?.join("target");
    fs::create_dir_all(&target_dir)?;
    Ok(target_dir.join("xtask-lint.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(args: &LintArgs) -> Vec<String> {
        pipeline(args).iter().map(Step::name).collect()
    }

    #[test]
    fn test_default_pipeline_checks_only() {
        assert_eq!(
            names(&LintArgs::default()),
            vec![
                "cargo fmt --all --check",
                "cargo clippy --workspace --all-targets -- -D warnings",
                "cargo test --workspace",
            ]
        );
    }

    #[test]
    fn test_fix_mode_applies_changes() {
        let args = LintArgs {
            fix: true,
            ..LintArgs::default()
        };
        let steps = pipeline(&args);

        assert_eq!(steps[0], Step::new(&["fmt", "--all"]));
        assert!(steps[1].args.contains(&"--fix"));
        assert!(steps[1].args.contains(&"--allow-dirty"));
        assert_eq!(steps[2].name(), "cargo test --workspace");
    }

    #[test]
    fn test_skip_flags() {
        let args = LintArgs {
            no_fmt: true,
            no_test: true,
            ..LintArgs::default()
        };
        let steps = pipeline(&args);

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].args[0], "clippy");

        let args = LintArgs {
            no_fmt: true,
            no_clippy: true,
            no_test: true,
            ..LintArgs::default()
        };
        assert!(pipeline(&args).is_empty());
    }

    #[test]
    fn test_log_entry() {
        assert_eq!(
            log_entry("cargo test --workspace", "ok\n"),
            "=== cargo test --workspace ===\nok\n\n"
        );
    }
}
