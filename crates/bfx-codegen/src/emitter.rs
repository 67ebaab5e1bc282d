use crate::memory::Address;

/// Output buffer of primitive ops with a symbolic pointer position.
///
/// Moves are emitted as deltas from the last known position, so every
/// piece of generated code must leave the real pointer where `cursor`
/// says it is.
#[derive(Debug, Default)]
pub struct Emitter {
    cursor: Address,
    code: String,
    loops: Vec<Address>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Address {
        self.cursor
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn into_code(self) -> String {
        self.code
    }

    pub fn move_to(&mut self, addr: Address) {
        if addr >= self.cursor {
            self.repeat('>', addr - self.cursor);
        } else {
            self.repeat('<', self.cursor - addr);
        }
        self.cursor = addr;
    }

    pub fn repeat(&mut self, op: char, count: usize) {
        self.code.extend(std::iter::repeat_n(op, count));
    }

    pub fn incr(&mut self) {
        self.code.push('+');
    }

    pub fn decr(&mut self) {
        self.code.push('-');
    }

    /// Open a loop on the current cell.
    pub fn open(&mut self) {
        self.loops.push(self.cursor);
        self.code.push('[');
    }

    /// Close the innermost loop; the pointer must be back on the loop cell.
    pub fn close(&mut self) {
        let start = self.loops.pop().expect("unbalanced loop close");
        assert_eq!(
            start, self.cursor,
            "loop opened at cell {} closed at cell {}",
            start, self.cursor
        );
        self.code.push(']');
    }

    /// Append code the cursor cannot follow, which the caller guarantees
    /// leaves the pointer at `end`.
    pub fn raw(&mut self, ops: &str, end: Address) {
        self.code.push_str(ops);
        self.cursor = end;
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_are_relative() {
        let mut e = Emitter::new();
        e.move_to(3);
        e.move_to(1);
        e.move_to(1);
        assert_eq!(e.code(), ">>><<");
        assert_eq!(e.cursor(), 1);
    }

    #[test]
    fn raw_code_repositions_cursor() {
        let mut e = Emitter::new();
        e.raw("[>]", 7);
        e.move_to(5);
        assert_eq!(e.code(), "[>]<<");
    }

    #[test]
    fn loops_nest() {
        let mut e = Emitter::new();
        e.move_to(2);
        e.open();
        e.decr();
        e.move_to(0);
        e.incr();
        e.move_to(2);
        e.close();
        assert_eq!(e.into_code(), ">>[-<<+>>]");
    }

    #[test]
    #[should_panic(expected = "closed at cell")]
    fn loop_closed_elsewhere_panics() {
        let mut e = Emitter::new();
        e.open();
        e.move_to(1);
        e.close();
    }
}
