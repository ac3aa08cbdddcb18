pub mod check;
pub mod generate;
pub mod replace;
pub mod roots;
pub mod tasks;
pub mod watch;

use std::path::PathBuf;

use blossom::GenerateOptions;

use crate::cli::RunArgs;

impl From<RunArgs> for GenerateOptions {
    fn from(args: RunArgs) -> Self {
        GenerateOptions {
            project: PathBuf::from(args.project.project),
            task: args.task,
            properties: args.properties,
            force: args.force,
            no_hooks: args.no_hooks,
        }
    }
}
