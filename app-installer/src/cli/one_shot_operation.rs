use crate::utils::binary_metadata::binary_metadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneShotCommand {
    PrintVersion,
}

impl OneShotCommand {
    /// Runs the one-shot operation
    pub fn run_one_shot(&self) {
        match self {
            OneShotCommand::PrintVersion => {
                println!("{}", binary_metadata());
            }
        }
    }
}
