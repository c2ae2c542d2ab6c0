//! Test doubles shared by the command tests.

use pwroute_pipewire::{CommandRunner, PwResult};

mockall::mock! {
    pub Runner {}

    impl CommandRunner for Runner {
        fn run(&self, program: &str, args: &[String]) -> PwResult<String>;
    }
}
