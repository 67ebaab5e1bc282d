mod machine;

pub use machine::{Machine, MachineOptions, VmError};

/// Run `code` on a fresh machine with default options.
pub fn run(code: &str) -> Result<Machine, VmError> {
    let mut machine = Machine::new(MachineOptions::default());
    machine.run(code)?;
    Ok(machine)
}
