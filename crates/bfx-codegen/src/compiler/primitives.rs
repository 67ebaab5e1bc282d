use super::*;

// Building blocks. Each one leaves the pointer on a known cell and every
// loop it opens is closed on the same cell.

impl Compiler {
    pub(super) fn bf_move(&mut self, addr: Address) {
        self.emitter.move_to(addr);
    }

    /// Zero `addr` with `[-]`, then add `value`.
    pub(super) fn bf_set(&mut self, addr: Address, value: u8) {
        self.bf_move(addr);
        self.emitter.open();
        self.emitter.decr();
        self.emitter.close();
        self.emitter.repeat('+', value as usize);
    }

    pub(super) fn bf_set_n(&mut self, start: Address, value: u8, count: usize) {
        for addr in start..start + count {
            self.bf_set(addr, value);
        }
    }

    /// `dest = src` through a scratch cell; `src` keeps its value.
    pub(super) fn bf_assign(&mut self, dest: Address, src: Address) {
        if dest == src {
            return;
        }
        let tmp = self.temp(1);

        self.bf_set(dest, 0);
        self.bf_set(tmp, 0);

        self.bf_move(src);
        self.emitter.open();
        self.emitter.decr();
        self.bf_move(dest);
        self.emitter.incr();
        self.bf_move(tmp);
        self.emitter.incr();
        self.bf_move(src);
        self.emitter.close();

        self.bf_move(tmp);
        self.emitter.open();
        self.emitter.decr();
        self.bf_move(src);
        self.emitter.incr();
        self.bf_move(tmp);
        self.emitter.close();

        self.bf_move(dest);
    }

    pub(super) fn bf_assign_n(&mut self, dest: Address, src: Address, count: usize) {
        for offset in 0..count {
            self.bf_assign(dest + offset, src + offset);
        }
    }

    pub(super) fn bf_incr(&mut self, addr: Address) {
        self.bf_move(addr);
        self.emitter.incr();
    }

    pub(super) fn bf_decr(&mut self, addr: Address) {
        self.bf_move(addr);
        self.emitter.decr();
    }

    /// Drain `from` into `to`, one unit at a time; `from` ends at zero.
    fn bf_drain(&mut self, from: Address, to: Address, op: char) {
        self.bf_move(from);
        self.emitter.open();
        self.emitter.decr();
        self.bf_move(to);
        match op {
            '+' => self.emitter.incr(),
            _ => self.emitter.decr(),
        }
        self.bf_move(from);
        self.emitter.close();
    }

    /// `target += rhs`; the pointer ends on `target`.
    pub(super) fn bf_add_to(&mut self, target: Address, rhs: Address) {
        let tmp = self.temp(1);
        self.bf_assign(tmp, rhs);
        self.bf_drain(tmp, target, '+');
        self.bf_move(target);
    }

    /// `target -= rhs`; the pointer ends on `target`.
    pub(super) fn bf_subtract_from(&mut self, target: Address, rhs: Address) {
        let tmp = self.temp(1);
        self.bf_assign(tmp, rhs);
        self.bf_drain(tmp, target, '-');
        self.bf_move(target);
    }

    /// `result = lhs * rhs` by repeated addition. `result` must be distinct
    /// from both operands.
    pub(super) fn bf_multiply(&mut self, lhs: Address, rhs: Address, result: Address) {
        let tmp = self.temp(1);
        self.bf_set(result, 0);
        self.bf_assign(tmp, rhs);
        self.emitter.open();
        self.emitter.decr();
        self.bf_add_to(result, lhs);
        self.bf_move(tmp);
        self.emitter.close();
        self.bf_move(result);
    }

    /// `result = !addr`.
    pub(super) fn bf_not(&mut self, addr: Address, result: Address) {
        let tmp = self.temp(1);
        self.bf_set(result, 1);
        self.bf_assign(tmp, addr);
        self.emitter.open();
        self.bf_set(result, 0);
        self.bf_set(tmp, 0);
        self.emitter.close();
        self.bf_move(result);
    }

    pub(super) fn bf_and(&mut self, lhs: Address, rhs: Address, result: Address) {
        let x = self.temp(1);
        let y = self.temp(1);
        self.bf_set(result, 0);
        self.bf_assign(y, rhs);
        self.bf_assign(x, lhs);
        self.emitter.open();
        self.bf_move(y);
        self.emitter.open();
        self.bf_set(result, 1);
        self.bf_set(y, 0);
        self.emitter.close();
        self.bf_set(x, 0);
        self.emitter.close();
        self.bf_move(result);
    }

    pub(super) fn bf_or(&mut self, lhs: Address, rhs: Address, result: Address) {
        let x = self.temp(1);
        let y = self.temp(1);
        self.bf_set(result, 0);
        self.bf_assign(x, lhs);
        self.emitter.open();
        self.bf_set(result, 1);
        self.bf_set(x, 0);
        self.emitter.close();
        self.bf_assign(y, rhs);
        self.emitter.open();
        self.bf_set(result, 1);
        self.bf_set(y, 0);
        self.emitter.close();
        self.bf_move(result);
    }

    /// Count both copies down together; they are equal iff the right copy
    /// hits zero exactly when the left one does.
    pub(super) fn bf_equal(&mut self, lhs: Address, rhs: Address, result: Address) {
        let left = self.temp(1);
        let right = self.temp(1);
        self.bf_set(result, 1);
        self.bf_assign(right, rhs);
        self.bf_assign(left, lhs);
        self.emitter.open();
        self.bf_decr(right);
        self.bf_decr(left);
        self.emitter.close();
        self.bf_move(right);
        self.emitter.open();
        self.bf_set(result, 0);
        self.bf_set(right, 0);
        self.emitter.close();
        self.bf_move(result);
    }

    pub(super) fn bf_not_equal(&mut self, lhs: Address, rhs: Address, result: Address) {
        let equal = self.temp(1);
        self.bf_equal(lhs, rhs, equal);
        self.bf_not(equal, result);
    }

    /// `result = lhs > rhs`: for every unit of `lhs`, decrement a copy of
    /// `rhs` that saturates at zero; each unit that finds it empty counts.
    pub(super) fn bf_greater(&mut self, lhs: Address, rhs: Address, result: Address) {
        let x = self.temp(1);
        let y = self.temp(1);
        let seen_zero = self.temp(1);
        let borrowed = self.temp(1);

        self.bf_set(seen_zero, 0);
        self.bf_set(borrowed, 0);
        self.bf_set(result, 0);
        self.bf_assign(y, rhs);
        self.bf_assign(x, lhs);

        self.emitter.open();
        self.bf_incr(seen_zero);

        self.bf_move(y);
        self.emitter.open();
        self.bf_set(seen_zero, 0);
        self.bf_incr(borrowed);
        self.bf_decr(y);
        self.emitter.close();

        self.bf_move(seen_zero);
        self.emitter.open();
        self.bf_incr(result);
        self.bf_decr(seen_zero);
        self.emitter.close();

        self.bf_move(borrowed);
        self.emitter.open();
        self.bf_incr(y);
        self.bf_decr(borrowed);
        self.emitter.close();

        self.bf_decr(y);
        self.bf_decr(x);
        self.emitter.close();

        self.bf_move(result);
    }

    pub(super) fn bf_less(&mut self, lhs: Address, rhs: Address, result: Address) {
        self.bf_greater(rhs, lhs, result);
    }

    pub(super) fn bf_greater_or_equal(&mut self, lhs: Address, rhs: Address, result: Address) {
        let equal = self.temp(1);
        let greater = self.temp(1);
        self.bf_equal(lhs, rhs, equal);
        self.bf_greater(lhs, rhs, greater);
        self.bf_or(equal, greater, result);
    }

    pub(super) fn bf_less_or_equal(&mut self, lhs: Address, rhs: Address, result: Address) {
        self.bf_greater_or_equal(rhs, lhs, result);
    }

    /// Quotient and remainder of `num / denom` in two fresh cells. A zero
    /// numerator yields `(0, 0)`; a zero denominator yields `(255, 255)`.
    pub(super) fn bf_div_mod(&mut self, num: Address, denom: Address) -> (Address, Address) {
        let block = self.temp(4);
        let loop_flag = block;
        let zero_flag = block + 1;
        let n = block + 2;
        let d = block + 3;

        let quotient = self.temp(1);
        let remainder = self.temp(1);

        self.bf_set(quotient, 0);
        self.bf_set(remainder, 0);
        self.bf_assign(n, num);
        self.bf_assign(d, denom);
        self.bf_set(loop_flag, 1);

        self.bf_not(n, zero_flag);
        self.emitter.open();
        self.bf_set(loop_flag, 0);
        self.bf_set(quotient, 0);
        self.bf_set(remainder, 0);
        self.bf_set(zero_flag, 0);
        self.emitter.close();

        self.bf_not(d, zero_flag);
        self.emitter.open();
        self.bf_set(loop_flag, 0);
        self.bf_set(quotient, 255);
        self.bf_set(remainder, 255);
        self.bf_set(zero_flag, 0);
        self.emitter.close();

        self.bf_move(loop_flag);
        self.emitter.open();
        self.bf_decr(n);
        self.bf_decr(d);
        self.bf_incr(remainder);

        self.bf_not(d, zero_flag);
        self.emitter.open();
        self.bf_incr(quotient);
        self.bf_assign(d, denom);
        self.bf_set(remainder, 0);
        self.bf_set(zero_flag, 0);
        self.emitter.close();

        self.bf_not(n, zero_flag);
        self.emitter.open();
        self.bf_set(loop_flag, 0);
        self.bf_set(zero_flag, 0);
        self.emitter.close();

        self.bf_move(loop_flag);
        self.emitter.close();

        (quotient, remainder)
    }
}
