use super::*;

// Operator semantics over single cells. Binary operators leave their
// operands untouched and return a fresh temporary; compound operators
// update the left operand in place.

impl Compiler {
    // ── Arithmetic ───────────────────────────────────────────

    pub(super) fn add(&mut self, lhs: Address, rhs: Address) -> Address {
        let result = self.temp(1);
        self.bf_assign(result, lhs);
        self.bf_add_to(result, rhs);
        result
    }

    pub(super) fn subtract(&mut self, lhs: Address, rhs: Address) -> Address {
        let result = self.temp(1);
        self.bf_assign(result, lhs);
        self.bf_subtract_from(result, rhs);
        result
    }

    pub(super) fn multiply(&mut self, lhs: Address, rhs: Address) -> Address {
        let result = self.temp(1);
        self.bf_multiply(lhs, rhs, result);
        result
    }

    pub(super) fn divide(&mut self, lhs: Address, rhs: Address) -> Address {
        self.bf_div_mod(lhs, rhs).0
    }

    pub(super) fn modulo(&mut self, lhs: Address, rhs: Address) -> Address {
        self.bf_div_mod(lhs, rhs).1
    }

    pub(super) fn add_to(&mut self, target: Address, rhs: Address) -> Address {
        self.bf_add_to(target, rhs);
        target
    }

    pub(super) fn subtract_from(&mut self, target: Address, rhs: Address) -> Address {
        self.bf_subtract_from(target, rhs);
        target
    }

    pub(super) fn multiply_by(&mut self, target: Address, rhs: Address) -> Address {
        let product = self.multiply(target, rhs);
        self.bf_assign(target, product);
        target
    }

    pub(super) fn divide_by(&mut self, target: Address, rhs: Address) -> Address {
        let (quotient, _) = self.bf_div_mod(target, rhs);
        self.bf_assign(target, quotient);
        target
    }

    pub(super) fn modulo_by(&mut self, target: Address, rhs: Address) -> Address {
        let (_, remainder) = self.bf_div_mod(target, rhs);
        self.bf_assign(target, remainder);
        target
    }

    /// `target /=% rhs`: quotient stored, remainder returned.
    pub(super) fn div_mod(&mut self, target: Address, rhs: Address) -> Address {
        let (quotient, remainder) = self.bf_div_mod(target, rhs);
        self.bf_assign(target, quotient);
        remainder
    }

    /// `target %=/ rhs`: remainder stored, quotient returned.
    pub(super) fn mod_div(&mut self, target: Address, rhs: Address) -> Address {
        let (quotient, remainder) = self.bf_div_mod(target, rhs);
        self.bf_assign(target, remainder);
        quotient
    }

    // ── Increment / decrement ────────────────────────────────

    pub(super) fn pre_increment(&mut self, addr: Address) -> Address {
        self.bf_incr(addr);
        addr
    }

    pub(super) fn pre_decrement(&mut self, addr: Address) -> Address {
        self.bf_decr(addr);
        addr
    }

    pub(super) fn post_increment(&mut self, addr: Address) -> Address {
        let old = self.temp(1);
        self.bf_assign(old, addr);
        self.bf_incr(addr);
        old
    }

    pub(super) fn post_decrement(&mut self, addr: Address) -> Address {
        let old = self.temp(1);
        self.bf_assign(old, addr);
        self.bf_decr(addr);
        old
    }

    // ── Comparison and logic ─────────────────────────────────

    pub(super) fn equal(&mut self, lhs: Address, rhs: Address) -> Address {
        let result = self.temp(1);
        self.bf_equal(lhs, rhs, result);
        result
    }

    pub(super) fn not_equal(&mut self, lhs: Address, rhs: Address) -> Address {
        let result = self.temp(1);
        self.bf_not_equal(lhs, rhs, result);
        result
    }

    pub(super) fn less(&mut self, lhs: Address, rhs: Address) -> Address {
        let result = self.temp(1);
        self.bf_less(lhs, rhs, result);
        result
    }

    pub(super) fn greater(&mut self, lhs: Address, rhs: Address) -> Address {
        let result = self.temp(1);
        self.bf_greater(lhs, rhs, result);
        result
    }

    pub(super) fn less_or_equal(&mut self, lhs: Address, rhs: Address) -> Address {
        let result = self.temp(1);
        self.bf_less_or_equal(lhs, rhs, result);
        result
    }

    pub(super) fn greater_or_equal(&mut self, lhs: Address, rhs: Address) -> Address {
        let result = self.temp(1);
        self.bf_greater_or_equal(lhs, rhs, result);
        result
    }

    pub(super) fn and(&mut self, lhs: Address, rhs: Address) -> Address {
        let result = self.temp(1);
        self.bf_and(lhs, rhs, result);
        result
    }

    pub(super) fn or(&mut self, lhs: Address, rhs: Address) -> Address {
        let result = self.temp(1);
        self.bf_or(lhs, rhs, result);
        result
    }
}
