//! Split orchestration.
//!
//! For every split definition and every listed branch, [`Splitter`] runs a
//! fixed five-step pipeline:
//!
//! 1. `splitsh-lite --prefix=<prefix> --target=refs/heads/split-<name>/<branch> --scratch`
//! 2. `git remote add split-<name> <target>` (failure tolerated, the remote may exist)
//! 3. `git push -f -u split-<name> split-<name>/<branch>:<branch>`
//! 4. `git remote remove split-<name>`
//! 5. `git branch -D split-<name>/<branch>`
//!
//! The first failure that is not tolerated aborts the whole run.

use tracing::{debug, info};

use crate::error::Result;
use crate::manifest::{SplitDefinition, SplitMapping};
use crate::output::Output;
use crate::process::{run_command, CommandLine, ProcessRunner};

/// Prefix of every temporary remote and local split branch.
pub const SPLIT_REMOTE_PREFIX: &str = "split";

/// Default history-splitting tool.
pub const DEFAULT_SPLITTER: &str = "splitsh-lite";

/// Default version-control client.
pub const DEFAULT_GIT: &str = "git";

/// External programs the pipeline invokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// History-splitting tool.
    pub splitter: String,
    /// Git client.
    pub git: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            splitter: DEFAULT_SPLITTER.to_string(),
            git: DEFAULT_GIT.to_string(),
        }
    }
}

/// Name of the temporary remote for a split.
pub fn remote_name(split_name: &str) -> String {
    format!("{SPLIT_REMOTE_PREFIX}-{split_name}")
}

/// Name of the local branch holding a split branch's extracted history.
pub fn local_branch(split_name: &str, branch: &str) -> String {
    format!("{}/{branch}", remote_name(split_name))
}

/// One command of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Command to run.
    pub command: CommandLine,
    /// Whether a non-zero exit is ignored.
    pub tolerate_failure: bool,
}

impl Step {
    fn required(command: CommandLine) -> Self {
        Self {
            command,
            tolerate_failure: false,
        }
    }

    fn tolerated(command: CommandLine) -> Self {
        Self {
            command,
            tolerate_failure: true,
        }
    }
}

/// Runs split pipelines through a [`ProcessRunner`], reporting to an [`Output`].
pub struct Splitter<R, O> {
    runner: R,
    output: O,
    tools: Toolchain,
}

impl<R: ProcessRunner, O: Output> Splitter<R, O> {
    /// Creates a splitter.
    pub fn new(runner: R, output: O, tools: Toolchain) -> Self {
        Self {
            runner,
            output,
            tools,
        }
    }

    /// The runner commands are sent to.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// The output progress is written to.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Consumes the splitter, returning its output.
    pub fn into_output(self) -> O {
        self.output
    }

    /// Builds the five commands that split `branch` of `split_name`.
    pub fn pipeline(
        &self,
        split_name: &str,
        definition: &SplitDefinition,
        branch: &str,
    ) -> [Step; 5] {
        let remote = remote_name(split_name);
        let local = local_branch(split_name, branch);
        let git = self.tools.git.as_str();

        [
            Step::required(CommandLine::new(
                self.tools.splitter.as_str(),
                [
                    format!("--prefix={}", definition.prefix),
                    format!("--target=refs/heads/{local}"),
                    "--scratch".to_string(),
                ],
            )),
            Step::tolerated(CommandLine::new(
                git,
                ["remote", "add", remote.as_str(), definition.target.as_str()],
            )),
            Step::required(CommandLine::new(
                git,
                [
                    "push".to_string(),
                    "-f".to_string(),
                    "-u".to_string(),
                    remote.clone(),
                    format!("{local}:{branch}"),
                ],
            )),
            Step::required(CommandLine::new(git, ["remote", "remove", remote.as_str()])),
            Step::required(CommandLine::new(git, ["branch", "-D", local.as_str()])),
        ]
    }

    /// Splits every branch of every definition, in manifest order.
    ///
    /// Returns the number of pipelines completed.
    pub fn split_all(&mut self, mapping: &SplitMapping) -> Result<usize> {
        let mut completed = 0;
        for (split_name, definition) in mapping.iter() {
            for branch in &definition.branches {
                self.split_branch(split_name, definition, branch)?;
                completed += 1;
            }
        }
        info!(pipelines = completed, "All splits completed");
        Ok(completed)
    }

    /// Splits a single branch of a single definition.
    pub fn split_branch(
        &mut self,
        split_name: &str,
        definition: &SplitDefinition,
        branch: &str,
    ) -> Result<()> {
        info!(
            split = %split_name,
            branch = %branch,
            prefix = %definition.prefix,
            target = %definition.target,
            "Splitting"
        );

        for step in self.pipeline(split_name, definition, branch) {
            run_command(
                &self.runner,
                &mut self.output,
                &step.command,
                step.tolerate_failure,
            )?;
        }

        debug!(split = %split_name, branch = %branch, "Split pushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::SplitError;
    use crate::output::MemoryOutput;
    use crate::process::ProcessOutput;

    /// Records every command and fails those whose rendering starts with a
    /// configured prefix.
    #[derive(Default)]
    struct ScriptedRunner {
        calls: RefCell<Vec<String>>,
        failing: Vec<(String, i32)>,
    }

    impl ScriptedRunner {
        fn failing_on(prefix: &str, code: i32) -> Self {
            Self {
                failing: vec![(prefix.to_string(), code)],
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn execute(&self, command: &CommandLine) -> Result<ProcessOutput> {
            let rendered = command.to_string();
            self.calls.borrow_mut().push(rendered.clone());

            let code = self
                .failing
                .iter()
                .find(|(prefix, _)| rendered.starts_with(prefix.as_str()))
                .map_or(0, |(_, code)| *code);

            Ok(ProcessOutput {
                code,
                stdout: String::new(),
                stderr: if code == 0 {
                    String::new()
                } else {
                    format!("{rendered} failed")
                },
            })
        }
    }

    fn mapping(content: &str) -> SplitMapping {
        SplitMapping::from_json("composer.json", content).unwrap()
    }

    fn splitter(runner: ScriptedRunner) -> Splitter<ScriptedRunner, MemoryOutput> {
        Splitter::new(runner, MemoryOutput::new(), Toolchain::default())
    }

    #[test]
    fn naming_helpers() {
        assert_eq!(remote_name("pkg-a"), "split-pkg-a");
        assert_eq!(local_branch("pkg-a", "main"), "split-pkg-a/main");
    }

    #[test]
    fn single_split_runs_five_steps_in_order() {
        let mapping = mapping(
            r#"{"extra":{"subtree-split":{"pkg-a":{"prefix":"packages/a","target":"git@host:org/pkg-a.git","branches":["main"]}}}}"#,
        );
        let mut splitter = splitter(ScriptedRunner::default());

        let completed = splitter.split_all(&mapping).unwrap();

        assert_eq!(completed, 1);
        assert_eq!(
            splitter.runner().calls(),
            vec![
                "splitsh-lite --prefix=packages/a --target=refs/heads/split-pkg-a/main --scratch",
                "git remote add split-pkg-a git@host:org/pkg-a.git",
                "git push -f -u split-pkg-a split-pkg-a/main:main",
                "git remote remove split-pkg-a",
                "git branch -D split-pkg-a/main",
            ]
        );

        let output = splitter.into_output();
        assert_eq!(
            output.notes(),
            vec![
                "Running: splitsh-lite --prefix=packages/a --target=refs/heads/split-pkg-a/main --scratch",
                "Running: git remote add split-pkg-a git@host:org/pkg-a.git",
                "Running: git push -f -u split-pkg-a split-pkg-a/main:main",
                "Running: git remote remove split-pkg-a",
                "Running: git branch -D split-pkg-a/main",
            ]
        );
    }

    #[test]
    fn runs_every_branch_of_every_split_in_order() {
        let mapping = mapping(
            r#"{"extra":{"subtree-split":{
                "b":{"prefix":"pb","target":"tb","branches":["main","2.x"]},
                "a":{"prefix":"pa","target":"ta","branches":["main","1.x","2.x"]}
            }}}"#,
        );
        let mut splitter = splitter(ScriptedRunner::default());

        let completed = splitter.split_all(&mapping).unwrap();

        assert_eq!(completed, 5);
        let calls = splitter.runner().calls();
        assert_eq!(calls.len(), 25);
        let extractions: Vec<_> = calls
            .iter()
            .filter(|c| c.starts_with("splitsh-lite"))
            .map(String::as_str)
            .collect();
        assert_eq!(
            extractions,
            vec![
                "splitsh-lite --prefix=pb --target=refs/heads/split-b/main --scratch",
                "splitsh-lite --prefix=pb --target=refs/heads/split-b/2.x --scratch",
                "splitsh-lite --prefix=pa --target=refs/heads/split-a/main --scratch",
                "splitsh-lite --prefix=pa --target=refs/heads/split-a/1.x --scratch",
                "splitsh-lite --prefix=pa --target=refs/heads/split-a/2.x --scratch",
            ]
        );
    }

    #[test]
    fn extraction_failure_stops_everything() {
        let mapping = mapping(
            r#"{"extra":{"subtree-split":{
                "a":{"prefix":"pa","target":"ta","branches":["main","1.x"]},
                "b":{"prefix":"pb","target":"tb","branches":["main"]}
            }}}"#,
        );
        let mut splitter = splitter(ScriptedRunner::failing_on("splitsh-lite", 1));

        let err = splitter.split_all(&mapping).unwrap_err();

        assert!(matches!(err, SplitError::Process { code: 1, .. }));
        assert_eq!(
            splitter.runner().calls(),
            vec!["splitsh-lite --prefix=pa --target=refs/heads/split-a/main --scratch"]
        );
    }

    #[test]
    fn remote_add_failure_is_tolerated() {
        let mapping = mapping(
            r#"{"extra":{"subtree-split":{"a":{"prefix":"pa","target":"ta","branches":["main"]}}}}"#,
        );
        let mut splitter = splitter(ScriptedRunner::failing_on("git remote add", 3));

        assert_eq!(splitter.split_all(&mapping).unwrap(), 1);
        assert_eq!(splitter.runner().calls().len(), 5);
        assert!(splitter
            .output()
            .notes()
            .contains(&"git remote add split-a ta failed"));
    }

    #[test]
    fn push_failure_skips_cleanup() {
        let mapping = mapping(
            r#"{"extra":{"subtree-split":{"a":{"prefix":"pa","target":"ta","branches":["main"]}}}}"#,
        );
        let mut splitter = splitter(ScriptedRunner::failing_on("git push", 128));

        let err = splitter.split_all(&mapping).unwrap_err();

        assert!(matches!(err, SplitError::Process { code: 128, .. }));
        let calls = splitter.runner().calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.last().unwrap().starts_with("git push"));
    }

    #[test]
    fn remote_remove_failure_is_fatal() {
        let mapping = mapping(
            r#"{"extra":{"subtree-split":{"a":{"prefix":"pa","target":"ta","branches":["main"]}}}}"#,
        );
        let mut splitter = splitter(ScriptedRunner::failing_on("git remote remove", 2));

        assert!(splitter.split_all(&mapping).is_err());
        assert_eq!(splitter.runner().calls().len(), 4);
    }

    #[test]
    fn empty_branch_list_runs_nothing() {
        let mapping = mapping(
            r#"{"extra":{"subtree-split":{"a":{"prefix":"pa","target":"ta","branches":[]}}}}"#,
        );
        let mut splitter = splitter(ScriptedRunner::default());

        assert_eq!(splitter.split_all(&mapping).unwrap(), 0);
        assert!(splitter.runner().calls().is_empty());
    }

    #[test]
    fn custom_toolchain_is_used() {
        let definition = SplitDefinition {
            prefix: "src".to_string(),
            target: "../out.git".to_string(),
            branches: vec!["main".to_string()],
        };
        let tools = Toolchain {
            splitter: "/opt/bin/splitsh-lite".to_string(),
            git: "/usr/local/bin/git".to_string(),
        };
        let splitter = Splitter::new(ScriptedRunner::default(), MemoryOutput::new(), tools);

        let steps = splitter.pipeline("lib", &definition, "main");

        assert_eq!(steps[0].command.program, "/opt/bin/splitsh-lite");
        assert!(steps[1..]
            .iter()
            .all(|step| step.command.program == "/usr/local/bin/git"));
        let tolerated: Vec<_> = steps.iter().map(|step| step.tolerate_failure).collect();
        assert_eq!(tolerated, vec![false, true, false, false, false]);
    }
}
