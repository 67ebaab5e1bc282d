use std::collections::VecDeque;

use tracing::trace;

#[derive(Debug, Clone)]
pub struct MachineOptions {
    /// Abort after this many executed ops; `None` runs until the code ends.
    pub step_limit: Option<u64>,
    /// Initial tape length. The tape grows to the right on demand.
    pub tape_len: usize,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            step_limit: Some(50_000_000),
            tape_len: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    #[error("unmatched '[' at offset {0}")]
    UnmatchedOpen(usize),
    #[error("unmatched ']' at offset {0}")]
    UnmatchedClose(usize),
    #[error("pointer moved left of cell 0 at offset {0}")]
    PointerUnderflow(usize),
    #[error("step limit of {0} exceeded")]
    StepLimit(u64),
}

/// Eight-bit wrapping cells on a right-unbounded tape.
///
/// `.` appends the current cell to the output; `,` reads the next input byte
/// (0 once input is exhausted). Every other character is a comment.
#[derive(Debug, Clone)]
pub struct Machine {
    tape: Vec<u8>,
    pointer: usize,
    input: VecDeque<u8>,
    output: Vec<u8>,
    steps: u64,
    options: MachineOptions,
}

impl Machine {
    pub fn new(options: MachineOptions) -> Self {
        Self {
            tape: vec![0; options.tape_len.max(1)],
            pointer: 0,
            input: VecDeque::new(),
            output: Vec::new(),
            steps: 0,
            options,
        }
    }

    pub fn with_input(mut self, input: &[u8]) -> Self {
        self.input.extend(input);
        self
    }

    pub fn run(&mut self, code: &str) -> Result<(), VmError> {
        let ops: Vec<u8> = code.bytes().collect();
        let jumps = match_brackets(&ops)?;

        let mut pc = 0;
        while pc < ops.len() {
            match ops[pc] {
                b'>' => {
                    self.pointer += 1;
                    if self.pointer == self.tape.len() {
                        self.tape.push(0);
                    }
                }
                b'<' => {
                    self.pointer = self
                        .pointer
                        .checked_sub(1)
                        .ok_or(VmError::PointerUnderflow(pc))?;
                }
                b'+' => self.tape[self.pointer] = self.tape[self.pointer].wrapping_add(1),
                b'-' => self.tape[self.pointer] = self.tape[self.pointer].wrapping_sub(1),
                b'.' => self.output.push(self.tape[self.pointer]),
                b',' => self.tape[self.pointer] = self.input.pop_front().unwrap_or(0),
                b'[' if self.tape[self.pointer] == 0 => pc = jumps[pc],
                b']' if self.tape[self.pointer] != 0 => pc = jumps[pc],
                _ => {}
            }
            pc += 1;

            self.steps += 1;
            if let Some(limit) = self.options.step_limit {
                if self.steps > limit {
                    return Err(VmError::StepLimit(limit));
                }
            }
        }

        trace!(steps = self.steps, cells = self.tape.len(), "halted");
        Ok(())
    }

    /// Value of a cell; cells never touched read as 0.
    pub fn cell(&self, addr: usize) -> u8 {
        self.tape.get(addr).copied().unwrap_or(0)
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Ops executed so far, comment characters included.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

/// Jump table: each bracket maps to the offset of its partner.
fn match_brackets(ops: &[u8]) -> Result<Vec<usize>, VmError> {
    let mut jumps = vec![0; ops.len()];
    let mut open = Vec::new();
    for (pc, &op) in ops.iter().enumerate() {
        match op {
            b'[' => open.push(pc),
            b']' => {
                let start = open.pop().ok_or(VmError::UnmatchedClose(pc))?;
                jumps[start] = pc;
                jumps[pc] = start;
            }
            _ => {}
        }
    }
    match open.pop() {
        Some(pc) => Err(VmError::UnmatchedOpen(pc)),
        None => Ok(jumps),
    }
}

#[cfg(test)]
mod tests;
