use super::*;

/// Carry `[index, index]` rightwards to cell `index` of the buffer,
/// shifting the copied cells back behind it.
const WALK_RIGHT: &str = "[>[->+<]<[->+<]>-]";
/// Same, also carrying a value in the third cell.
const WALK_RIGHT_WITH_VALUE: &str = "[>>[->+<]<[->+<]<[->+<]>-]";
/// Walk back to the start of the buffer.
const WALK_LEFT_FETCH: &str = "[<[-<+>]>[-<+>]<-]<";
const WALK_LEFT_STORE: &str = "[[-<+>]<-]<";

impl Compiler {
    /// `lhs = rhs`. A single cell fills a wider target; otherwise sizes
    /// must match.
    pub fn assign(&mut self, lhs: &Place, rhs: &Place) -> Result<Place, CompileError> {
        let (left, right) = (lhs.size(), rhs.size());
        if left > 1 && right == 1 {
            for offset in 0..left {
                self.bf_assign(lhs.addr + offset, rhs.addr);
            }
        } else if left == right {
            self.bf_assign_n(lhs.addr, rhs.addr, left);
        } else {
            return Err(self.error(ErrorKind::SizeMismatch { left, right }));
        }
        Ok(lhs.clone())
    }

    /// String literal as an array of its bytes.
    pub fn string(&mut self, text: &str) -> Result<Place, CompileError> {
        self.check_size("string literal", text.len())?;
        let start = self.temp(text.len());
        for (offset, byte) in text.bytes().enumerate() {
            self.bf_set(start + offset, byte);
        }
        Ok(Place::new(start, Type::Int(text.len())))
    }

    /// `#{a, b, c}`: one cell per element, evaluated in order.
    pub fn array_from_list(&mut self, items: &[Instr]) -> Result<Place, CompileError> {
        self.check_size("array literal", items.len())?;
        let start = self.temp(items.len());
        for (offset, item) in items.iter().enumerate() {
            let value = self.value(item.as_ref())?;
            self.scalar(&value)?;
            self.bf_assign(start + offset, value.addr);
        }
        Ok(Place::new(start, Type::Int(items.len())))
    }

    /// `#[N, v]` with a literal `v`.
    pub fn array_fill(&mut self, size: &SizeSpec, value: u8) -> Result<Place, CompileError> {
        let size = self.resolve_size(size)?;
        self.check_size("array literal", size)?;
        let start = self.temp(size);
        self.bf_set_n(start, value, size);
        Ok(Place::new(start, Type::Int(size)))
    }

    /// `#[N, x]` with a runtime fill value of size 1.
    pub fn array_fill_with(&mut self, size: &SizeSpec, value: &Place) -> Result<Place, CompileError> {
        let size = self.resolve_size(size)?;
        self.check_size("array literal", size)?;
        if value.size() != 1 {
            return Err(self.error(ErrorKind::FillValueSize(value.size())));
        }
        let start = self.temp(size);
        for offset in 0..size {
            self.bf_assign(start + offset, value.addr);
        }
        Ok(Place::new(start, Type::Int(size)))
    }

    /// Moves between a buffer and the array it serves, in both directions.
    fn shuttle(buffer: Address, array: Address) -> (String, String) {
        let distance = buffer.abs_diff(array);
        let left = "<".repeat(distance);
        let right = ">".repeat(distance);
        if buffer > array {
            (right, left)
        } else {
            (left, right)
        }
    }

    /// Read `array[index]` where `index` is only known at run time.
    ///
    /// A buffer of `size + 2` cells walks to the element's offset, carrying
    /// the index twice (one copy counts down the trip, one counts it back).
    /// The element is copied into the buffer, restored in the array, and the
    /// buffer walks home. Out-of-range indices are undefined behaviour.
    pub fn fetch_element(&mut self, array: &Place, index: &Place) -> Result<Place, CompileError> {
        self.scalar(index)?;
        let size = array.size();
        let buffer = self.temp(size + 2);
        let (array_to_buffer, buffer_to_array) = Self::shuttle(buffer, array.addr);

        self.bf_assign(buffer, index.addr);
        self.bf_assign(buffer + 1, buffer);
        self.bf_set_n(buffer + 2, 0, size);

        self.bf_move(buffer);
        let mut code = String::from(WALK_RIGHT);
        code += &buffer_to_array;
        code += "[-";
        code += &array_to_buffer;
        code += ">>+<<";
        code += &buffer_to_array;
        code += "]";
        code += &array_to_buffer;
        code += ">>[-<<+";
        code += &buffer_to_array;
        code += "+";
        code += &array_to_buffer;
        code += ">>]<";
        code += WALK_LEFT_FETCH;
        self.emitter.raw(&code, buffer);

        let result = self.temp(1);
        self.bf_assign(result, buffer);
        Ok(Place::new(result, Type::Int(1)))
    }

    /// Write `array[index] = value` where `index` is only known at run time.
    /// Yields `value`.
    pub fn assign_element(
        &mut self,
        array: &Place,
        index: &Place,
        value: &Place,
    ) -> Result<Place, CompileError> {
        self.scalar(index)?;
        if value.size() != 1 {
            return Err(self.error(ErrorKind::SizeMismatch {
                left: 1,
                right: value.size(),
            }));
        }
        let size = array.size();
        let buffer = self.temp(size + 2);
        let (array_to_buffer, buffer_to_array) = Self::shuttle(buffer, array.addr);

        self.bf_assign(buffer, index.addr);
        self.bf_assign(buffer + 1, buffer);
        self.bf_assign(buffer + 2, value.addr);
        self.bf_set_n(buffer + 3, 0, size - 1);

        self.bf_move(buffer);
        let mut code = String::from(WALK_RIGHT_WITH_VALUE);
        code += &buffer_to_array;
        code += "[-]";
        code += &array_to_buffer;
        code += ">>[-<<";
        code += &buffer_to_array;
        code += "+";
        code += &array_to_buffer;
        code += ">>]<";
        code += WALK_LEFT_STORE;
        self.emitter.raw(&code, buffer);

        Ok(value.clone())
    }
}
