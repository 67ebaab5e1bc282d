/// Collapse runs of opposite moves (`>`/`<`) and of opposite increments
/// (`+`/`-`) into their net effect. Runs end at any other symbol; loop
/// structure is left untouched.
pub fn cancel_opposite_commands(code: &str) -> String {
    let moves = cancel(code, '>', '<');
    cancel(&moves, '+', '-')
}

fn cancel(input: &str, up: char, down: char) -> String {
    let mut result = String::with_capacity(input.len());
    let mut count: i64 = 0;

    let flush = |result: &mut String, count: &mut i64| {
        let op = if *count > 0 { up } else { down };
        result.extend(std::iter::repeat_n(op, count.unsigned_abs() as usize));
        *count = 0;
    };

    for c in input.chars() {
        if c == up {
            count += 1;
        } else if c == down {
            count -= 1;
        } else {
            flush(&mut result, &mut count);
            result.push(c);
        }
    }

    flush(&mut result, &mut count);
    result
}
