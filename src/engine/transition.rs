// ============================================================================
// Transition Function
// One keystroke: (state, key) -> next state, dispatched over mode and key
// ============================================================================

use crate::domain::{
    ArithOp, CalculatorConfig, CalculatorState, EntryBuffer, FuncKey, Key, Modifier, PendingOp,
    Stack, MEMORY_REGISTERS,
};
use crate::finance::{
    amortize, bond_price, depreciate, simple_interest, solve_tvm, yield_to_maturity,
    DepreciationMethod, FinRegister, FinancialRegisters,
};
use crate::numeric::{
    days_between_encoded, decode_date, factorial, format_entry, frac, intg, round_to_decimals,
    shift_encoded_date, CalcError, CalcResult, DateFormat, DisplayFormat,
};

/// Apply one key to `state` and return the resulting state.
///
/// Pure and total: the input is never modified and no key panics. A key that
/// fails with a domain error yields the previous registers unchanged, the
/// error label set, and the shift cancelled.
pub fn transition(state: &CalculatorState, key: Key, config: &CalculatorConfig) -> CalculatorState {
    let mut next = state.clone();
    let result = Machine {
        state: &mut next,
        config,
    }
    .apply(key);

    match result {
        Ok(()) => next,
        Err(error) => {
            tracing::trace!(?key, %error, "key raised calculator error");
            let mut failed = state.clone();
            failed.error = Some(error);
            failed.modifier = Modifier::None;
            failed.pending = None;
            failed
        }
    }
}

/// Working view over the state being built for one key
struct Machine<'a> {
    state: &'a mut CalculatorState,
    config: &'a CalculatorConfig,
}

impl Machine<'_> {
    fn apply(&mut self, key: Key) -> CalcResult<()> {
        if key == Key::Power {
            self.toggle_power();
            return Ok(());
        }
        if !self.state.power_on {
            return Ok(());
        }

        self.state.error = None;

        if let Key::Shift(modifier) = key {
            self.state.modifier = if self.state.modifier == modifier {
                Modifier::None
            } else {
                modifier
            };
            self.state.pending = None;
            return Ok(());
        }

        if let Some(pending) = self.state.pending {
            self.register_sequence(pending, key);
            return Ok(());
        }

        match std::mem::take(&mut self.state.modifier) {
            Modifier::F => self.f_shifted(key),
            Modifier::G => self.g_shifted(key),
            Modifier::None => self.unshifted(key),
        }
    }

    // ========================================================================
    // Display & Entry Helpers
    // ========================================================================

    fn x(&self) -> f64 {
        self.state.stack.x()
    }

    fn y(&self) -> f64 {
        self.state.stack.y()
    }

    fn show(&mut self, value: f64) {
        self.state.display = self
            .config
            .render(value, self.state.decimals, self.state.display_format);
    }

    fn show_x(&mut self) {
        self.show(self.x());
    }

    fn show_count(&mut self, value: f64) {
        self.state.display = self.config.render(value, 0, DisplayFormat::Fix);
    }

    fn show_entry(&mut self) {
        if let Some(buffer) = &self.state.input_buffer {
            self.state.display = format_entry(buffer.as_str(), self.config.locale);
        }
    }

    /// Write the typed entry into X and leave entry mode
    fn commit(&mut self) {
        if let Some(buffer) = self.state.input_buffer.take() {
            self.state.stack.set_x(buffer.value());
        }
    }

    /// Buffer for the keystroke; a new entry replaces X once committed
    fn entry(&mut self) -> &mut EntryBuffer {
        self.state.input_buffer.get_or_insert_with(EntryBuffer::new)
    }

    fn toggle_power(&mut self) {
        self.commit();
        self.state.power_on = !self.state.power_on;
        self.state.error = None;
        self.state.modifier = Modifier::None;
        self.state.pending = None;
        if self.state.power_on {
            self.show_x();
        } else {
            self.state.display.clear();
        }
    }

    // ========================================================================
    // STO / RCL Register Sequences
    // ========================================================================

    fn register_sequence(&mut self, pending: PendingOp, key: Key) {
        match (pending, key) {
            (_, Key::Dot) => {
                if !pending.is_indirect() {
                    let next = pending.indirect();
                    self.state.pending = Some(next);
                    self.state.display = next.to_string();
                }
            }
            (
                PendingOp::Store {
                    op: None,
                    indirect: false,
                },
                Key::Arith(op),
            ) => {
                let next = PendingOp::Store {
                    op: Some(op),
                    indirect: false,
                };
                self.state.pending = Some(next);
                self.state.display = next.to_string();
            }
            (_, Key::Digit(digit)) => {
                self.state.pending = None;
                let index = pending.register(digit);
                if index < MEMORY_REGISTERS {
                    self.complete_register_op(pending, index);
                }
            }
            _ => {
                self.state.pending = None;
                self.show_x();
            }
        }
    }

    fn complete_register_op(&mut self, pending: PendingOp, index: usize) {
        let x = self.x();
        match pending {
            PendingOp::Store { op, .. } => {
                let current = self.state.memory[index];
                self.state.memory[index] = match op {
                    None => x,
                    Some(ArithOp::Div) if x == 0.0 => current,
                    Some(op) => op.apply(current, x),
                };
                self.show_x();
            }
            PendingOp::Recall { .. } => {
                self.state.stack.push(self.state.memory[index]);
                self.show_x();
            }
        }
    }

    // ========================================================================
    // Unshifted Keys
    // ========================================================================

    fn unshifted(&mut self, key: Key) -> CalcResult<()> {
        match key {
            Key::Digit(digit) => {
                self.entry().push_digit(digit);
                self.show_entry();
            }
            Key::Dot => {
                self.entry().push_dot();
                self.show_entry();
            }
            Key::Func(FuncKey::Eex) => {
                self.entry().start_exponent();
                self.show_entry();
            }
            Key::Literal(literal) => {
                *self.entry() = literal;
                self.show_entry();
            }
            Key::Chs => {
                if let Some(buffer) = self.state.input_buffer.as_mut() {
                    buffer.toggle_sign();
                    self.show_entry();
                } else {
                    let x = self.x();
                    self.state.stack.set_x(-x);
                    self.show_x();
                }
            }
            Key::Clx => {
                self.state.input_buffer = None;
                self.show(0.0);
            }
            Key::Enter => {
                self.commit();
                let x = self.x();
                self.push_result(x);
            }
            Key::Arith(op) => {
                self.commit();
                let (x, y) = (self.x(), self.y());
                self.binary(op.apply(y, x), x);
            }
            Key::Fin(register) => self.financial_key(register)?,
            Key::Func(func) => self.function_key(func)?,
            Key::Shift(_) | Key::Power | Key::Unmapped => {}
        }
        Ok(())
    }

    /// `[result, Z, T, T]` with X saved as last x
    fn binary(&mut self, result: f64, x: f64) {
        self.state.stack.drop_with(result);
        self.state.last_x = x;
        self.show_x();
    }

    /// Replace X only, saving the consumed X as last x
    fn unary(&mut self, result: f64) {
        self.state.last_x = self.x();
        self.state.stack.set_x(result);
        self.show_x();
    }

    fn push_result(&mut self, value: f64) {
        self.state.stack.push(value);
        self.show_x();
    }

    fn financial_key(&mut self, register: FinRegister) -> CalcResult<()> {
        if let Some(buffer) = self.state.input_buffer {
            let value = buffer.value();
            self.commit();
            self.state.financial.set(register, value);
            self.show_x();
            return Ok(());
        }

        let solved = solve_tvm(&self.state.financial, self.state.beg_mode, register)?;
        self.state.financial.set(register, solved);
        self.push_result(solved);
        Ok(())
    }

    fn function_key(&mut self, func: FuncKey) -> CalcResult<()> {
        self.commit();
        let (x, y) = (self.x(), self.y());

        match func {
            FuncKey::Power => self.binary(y.powf(x), x),
            FuncKey::Reciprocal => {
                if x == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                self.unary(1.0 / x);
            }
            FuncKey::PercentTotal => {
                if y == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                self.unary(x / y * 100.0);
            }
            FuncKey::DeltaPercent => {
                if y == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                self.unary((x - y) / y * 100.0);
            }
            FuncKey::Percent => self.unary(y * x / 100.0),
            FuncKey::RollDown => {
                self.state.stack.roll_down();
                self.show_x();
            }
            FuncKey::Swap => {
                self.state.stack.swap_xy();
                self.show_x();
            }
            FuncKey::Sto | FuncKey::Rcl => {
                let pending = if func == FuncKey::Sto {
                    PendingOp::Store {
                        op: None,
                        indirect: false,
                    }
                } else {
                    PendingOp::Recall { indirect: false }
                };
                self.state.pending = Some(pending);
                self.state.display = pending.to_string();
            }
            FuncKey::SigmaPlus => {
                let n = self.state.stats.accumulate(x, y);
                self.after_sigma(n, x);
            }
            // Keystroke programming is not emulated
            FuncKey::RunStop | FuncKey::Sst | FuncKey::Eex => self.show_x(),
        }
        Ok(())
    }

    /// Stack and display after Σ+ or Σ-: `[n, x, old Y, old Z]`
    fn after_sigma(&mut self, n: i64, x: f64) {
        self.state.stack.replace_xy_lift(n as f64, x);
        self.state.last_x = x;
        self.show_count(n as f64);
    }

    // ========================================================================
    // f-Shifted Keys
    // ========================================================================

    fn f_shifted(&mut self, key: Key) -> CalcResult<()> {
        match key {
            Key::Digit(digit) => {
                self.commit();
                self.state.decimals = digit;
                self.state.display_format = DisplayFormat::Fix;
                self.show_x();
            }
            Key::Dot => {
                self.commit();
                self.state.display_format = DisplayFormat::Sci;
                self.show_x();
            }
            Key::Clx => {
                self.state.input_buffer = None;
                self.state.stack.clear();
                self.state.financial = FinancialRegisters::default();
                self.state.stats.clear();
                self.state.memory = [0.0; MEMORY_REGISTERS];
                self.state.cash_flows.clear();
                self.state.last_x = 0.0;
                self.show_x();
            }
            Key::Func(FuncKey::Sst) => {
                self.commit();
                self.state.stats.clear();
                self.show_x();
            }
            Key::Func(FuncKey::Swap) => {
                self.commit();
                self.state.financial = FinancialRegisters::default();
                self.show_x();
            }
            // CLEAR PRGM: nothing to clear without program memory
            Key::Func(FuncKey::RollDown) => {
                self.commit();
                self.show_x();
            }
            Key::Fin(register) => {
                self.commit();
                self.f_financial(register)?;
            }
            Key::Func(FuncKey::Power) => {
                self.commit();
                let (settlement, maturity) = self.bond_dates()?;
                let FinancialRegisters { i, pmt, .. } = self.state.financial;
                self.push_result(bond_price(settlement, maturity, pmt, i));
            }
            Key::Func(FuncKey::Reciprocal) => {
                self.commit();
                let (settlement, maturity) = self.bond_dates()?;
                let FinancialRegisters { pv, pmt, .. } = self.state.financial;
                self.push_result(yield_to_maturity(settlement, maturity, pmt, pv));
            }
            Key::Func(FuncKey::PercentTotal) => self.depreciation(DepreciationMethod::StraightLine)?,
            Key::Func(FuncKey::DeltaPercent) => {
                self.depreciation(DepreciationMethod::SumOfYearsDigits)?
            }
            Key::Func(FuncKey::Percent) => {
                self.depreciation(DepreciationMethod::DecliningBalance)?
            }
            _ => {}
        }
        Ok(())
    }

    fn f_financial(&mut self, register: FinRegister) -> CalcResult<()> {
        match register {
            FinRegister::N => {
                let schedule = amortize(&self.state.financial, self.x())?;
                self.state.financial.pv = schedule.balance;
                self.state.financial.n = schedule.periods;
                self.state.stack = Stack::new(
                    schedule.balance,
                    schedule.principal,
                    schedule.interest,
                    self.state.stack.t(),
                );
                self.show_x();
            }
            FinRegister::I => self.push_result(simple_interest(&self.state.financial)),
            FinRegister::Pv => {
                let npv = self.state.cash_flows.npv(self.state.financial.i);
                self.push_result(npv);
            }
            FinRegister::Pmt => {
                let rounded = round_to_decimals(self.x(), self.state.decimals);
                self.state.stack.set_x(rounded);
                self.show_x();
            }
            FinRegister::Fv => {
                let rate = self.state.cash_flows.irr()?;
                self.state.financial.i = rate;
                self.push_result(rate);
            }
        }
        Ok(())
    }

    /// Settlement date from Y and maturity date from X
    fn bond_dates(&self) -> CalcResult<(chrono::NaiveDate, chrono::NaiveDate)> {
        let format = self.state.date_format;
        Ok((decode_date(self.y(), format)?, decode_date(self.x(), format)?))
    }

    /// `[depreciation, book value, Z, T]` for the year in X
    fn depreciation(&mut self, method: DepreciationMethod) -> CalcResult<()> {
        self.commit();
        let year = self.x();
        let result = depreciate(method, &self.state.financial, year)?;
        let [_, _, z, t] = self.state.stack.as_array();
        self.state.stack = Stack::new(result.depreciation, result.book_value, z, t);
        self.show_x();
        Ok(())
    }

    // ========================================================================
    // g-Shifted Keys
    // ========================================================================

    fn g_shifted(&mut self, key: Key) -> CalcResult<()> {
        match key {
            Key::Fin(register) => {
                self.commit();
                self.g_financial(register);
            }
            Key::Chs => {
                self.commit();
                self.date_plus_days()?;
            }
            Key::Digit(digit) => self.g_digit(digit)?,
            Key::Dot => {
                let x = self.state.x_value();
                self.commit();
                let (sx, _) = self.state.stats.std_dev()?;
                let (mean_x, _) = self.state.stats.mean()?;
                self.summary(sx, mean_x, x);
            }
            Key::Func(func) => self.g_function(func)?,
            Key::Arith(ArithOp::Mul) => {
                self.commit();
                let x = self.x();
                self.push_result(x * x);
            }
            Key::Arith(ArithOp::Add) => {
                self.commit();
                self.push_result(self.state.last_x);
            }
            _ => {}
        }
        Ok(())
    }

    /// `[x, y, old Y, old Z]` for the statistics summaries
    fn summary(&mut self, x: f64, y: f64, consumed: f64) {
        self.state.stack.replace_xy_lift(x, y);
        self.state.last_x = consumed;
        self.show_x();
    }

    fn g_financial(&mut self, register: FinRegister) {
        let x = self.x();
        match register {
            FinRegister::N => {
                self.state.financial.n = x * 12.0;
                self.push_result(x * 12.0);
            }
            FinRegister::I => {
                self.state.financial.i = x / 12.0;
                self.push_result(x / 12.0);
            }
            FinRegister::Pv => {
                self.state.cash_flows.reset_with(x);
                self.state.financial.pv = x;
                self.push_result(x);
            }
            FinRegister::Pmt => {
                let j = self.state.cash_flows.push(x) as f64;
                self.state.stack.push(j);
                self.show_count(j);
            }
            FinRegister::Fv => match self.state.cash_flows.set_last_count(x) {
                Some(count) => self.show_count(f64::from(count)),
                None => self.show_x(),
            },
        }
    }

    fn g_digit(&mut self, digit: u8) -> CalcResult<()> {
        let x = self.state.x_value();
        match digit {
            0 => {
                self.commit();
                let (mean_x, mean_y) = self.state.stats.mean()?;
                self.summary(mean_x, mean_y, x);
            }
            1 => {
                self.commit();
                let (x_hat, r) = self.state.stats.estimate_x(x);
                self.summary(x_hat, r, x);
            }
            2 => {
                self.commit();
                let (y_hat, r) = self.state.stats.estimate_y(x);
                self.summary(y_hat, r, x);
            }
            3 => {
                self.commit();
                self.push_result(factorial(x));
            }
            4 => self.set_date_format(DateFormat::Dmy),
            5 => self.set_date_format(DateFormat::Mdy),
            6 => {
                self.commit();
                let weighted = self.state.stats.weighted_mean()?;
                self.state.last_x = x;
                self.push_result(weighted);
            }
            7 => self.set_begin_mode(true),
            8 => self.set_begin_mode(false),
            _ => {}
        }
        Ok(())
    }

    fn set_date_format(&mut self, format: DateFormat) {
        self.commit();
        self.state.date_format = format;
        self.show_x();
    }

    fn set_begin_mode(&mut self, begin: bool) {
        self.commit();
        self.state.beg_mode = begin;
        self.show_x();
    }

    fn g_function(&mut self, func: FuncKey) -> CalcResult<()> {
        self.commit();
        let x = self.x();
        match func {
            FuncKey::Power => self.push_result(x.sqrt()),
            FuncKey::Reciprocal => self.push_result(x.exp()),
            FuncKey::PercentTotal => self.push_result(x.ln()),
            FuncKey::DeltaPercent => self.push_result(frac(x)),
            FuncKey::Percent => self.push_result(intg(x)),
            FuncKey::Eex => {
                let days = days_between_encoded(self.y(), x, self.state.date_format)?;
                self.push_result(days as f64);
            }
            FuncKey::SigmaPlus => {
                let y = self.y();
                let n = self.state.stats.remove(x, y);
                self.after_sigma(n, x);
            }
            // Remaining g legends belong to keystroke programming
            _ => self.show_x(),
        }
        Ok(())
    }

    /// DATE: base date in Y shifted by the days in X
    fn date_plus_days(&mut self) -> CalcResult<()> {
        let [days, base, z, t] = self.state.stack.as_array();
        let (date, weekday) = shift_encoded_date(base, days, self.state.date_format)?;
        self.state.stack = Stack::new(date, f64::from(weekday), z, t);
        self.state.last_x = days;
        let date_text = self
            .config
            .render(date, self.state.decimals, self.state.display_format);
        self.state.display = format!("{date_text} {weekday}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(state: &CalculatorState, keys: &[Key]) -> CalculatorState {
        let config = CalculatorConfig::default();
        keys.iter()
            .fold(state.clone(), |acc, key| transition(&acc, *key, &config))
    }

    fn keys(text: &str) -> Vec<Key> {
        text.chars()
            .map(|c| match c {
                '0'..='9' => Key::Digit(c as u8 - b'0'),
                '.' => Key::Dot,
                _ => Key::Unmapped,
            })
            .collect()
    }

    fn typed(state: &CalculatorState, number: &str) -> CalculatorState {
        run(state, &keys(number))
    }

    fn with_stack(values: [f64; 4]) -> CalculatorState {
        CalculatorState {
            stack: Stack::from_array(values),
            ..CalculatorState::new()
        }
    }

    const F: Key = Key::Shift(Modifier::F);
    const G: Key = Key::Shift(Modifier::G);

    #[test]
    fn test_digit_entry_and_display() {
        let state = typed(&CalculatorState::new(), "12.5");
        assert_eq!(state.input_buffer.unwrap().as_str(), "12.5");
        assert_eq!(state.display, "12.5_");
    }

    #[test]
    fn test_enter_duplicates_x() {
        let state = typed(&CalculatorState::new(), "7");
        let state = run(&state, &[Key::Enter]);
        assert_eq!(state.stack.as_array()[..2], [7.0, 7.0]);
        assert!(state.input_buffer.is_none());
        assert_eq!(state.display, "7.00");
    }

    #[test]
    fn test_entry_after_enter_overwrites_x() {
        let state = typed(&CalculatorState::new(), "3");
        let state = run(&state, &[Key::Enter]);
        let state = typed(&state, "4");
        let state = run(&state, &[Key::Arith(ArithOp::Add)]);
        assert_eq!(state.stack.x(), 7.0);
        assert_eq!(state.last_x, 4.0);
    }

    #[test]
    fn test_entry_after_result_replaces_x() {
        let state = typed(&CalculatorState::new(), "2");
        let state = run(&state, &[Key::Enter]);
        let state = typed(&state, "3");
        let state = run(&state, &[Key::Arith(ArithOp::Add)]);
        assert_eq!(state.stack.as_array(), [5.0, 0.0, 0.0, 0.0]);

        // The new entry takes X's place; Y is still the old Y
        let state = typed(&state, "4");
        assert_eq!(state.stack.as_array(), [5.0, 0.0, 0.0, 0.0]);
        let state = run(&state, &[Key::Arith(ArithOp::Add)]);
        assert_eq!(state.stack.as_array(), [4.0, 0.0, 0.0, 0.0]);
        assert_eq!(state.last_x, 4.0);
    }

    #[test]
    fn test_binary_drops_stack() {
        let state = with_stack([2.0, 10.0, 30.0, 40.0]);
        let state = run(&state, &[Key::Arith(ArithOp::Sub)]);
        assert_eq!(state.stack.as_array(), [8.0, 30.0, 40.0, 40.0]);
        assert_eq!(state.last_x, 2.0);
    }

    #[test]
    fn test_division_by_zero_yields_zero() {
        let state = with_stack([0.0, 10.0, 0.0, 0.0]);
        let state = run(&state, &[Key::Arith(ArithOp::Div)]);
        assert_eq!(state.stack.x(), 0.0);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_reciprocal_of_zero_is_error_zero() {
        let state = with_stack([0.0, 5.0, 6.0, 7.0]);
        let after = run(&state, &[Key::Func(FuncKey::Reciprocal)]);
        assert_eq!(after.error, Some(CalcError::DivisionByZero));
        assert_eq!(after.stack, state.stack);
        assert_eq!(after.display_text(), "Error 0");

        // Next key clears the label
        let cleared = run(&after, &[Key::Clx]);
        assert!(cleared.error.is_none());
    }

    #[test]
    fn test_percent_keys_keep_y() {
        let state = with_stack([15.0, 200.0, 0.0, 0.0]);
        assert_eq!(
            run(&state, &[Key::Func(FuncKey::Percent)]).stack.as_array()[..2],
            [30.0, 200.0]
        );
        assert_eq!(run(&state, &[Key::Func(FuncKey::PercentTotal)]).stack.x(), 7.5);
        let delta = with_stack([250.0, 200.0, 0.0, 0.0]);
        assert_eq!(run(&delta, &[Key::Func(FuncKey::DeltaPercent)]).stack.x(), 25.0);
    }

    #[test]
    fn test_power_is_binary() {
        let state = with_stack([3.0, 2.0, 9.0, 9.0]);
        let state = run(&state, &[Key::Func(FuncKey::Power)]);
        assert_eq!(state.stack.as_array(), [8.0, 9.0, 9.0, 9.0]);
    }

    #[test]
    fn test_chs_negates_entry_or_x() {
        let state = typed(&CalculatorState::new(), "5");
        let state = run(&state, &[Key::Chs]);
        assert_eq!(state.display, "-5_");

        let state = with_stack([4.0, 1.0, 0.0, 0.0]);
        let state = run(&state, &[Key::Chs]);
        assert_eq!(state.stack.x(), -4.0);
    }

    #[test]
    fn test_clx_leaves_stack() {
        let state = typed(&with_stack([1.0, 2.0, 3.0, 4.0]), "99");
        let state = run(&state, &[Key::Clx]);
        assert!(state.input_buffer.is_none());
        assert_eq!(state.display, "0.00");
        assert_eq!(state.stack.y(), 1.0);
    }

    #[test]
    fn test_store_and_recall() {
        let state = typed(&CalculatorState::new(), "42");
        let state = run(&state, &[Key::Func(FuncKey::Sto)]);
        assert_eq!(state.display, "STO _");
        let state = run(&state, &[Key::Digit(5)]);
        assert_eq!(state.memory[5], 42.0);
        assert!(state.pending.is_none());

        let state = run(&state, &[Key::Func(FuncKey::Rcl), Key::Dot]);
        assert_eq!(state.display, "RCL . _");
        let state = run(&state, &[Key::Dot, Key::Digit(5)]);
        assert_eq!(state.stack.x(), 0.0);
        assert_eq!(state.stack.y(), 42.0);
    }

    #[test]
    fn test_store_arithmetic() {
        let mut state = with_stack([4.0, 0.0, 0.0, 0.0]);
        state.memory[2] = 10.0;
        let plus = run(&state, &[Key::Func(FuncKey::Sto), Key::Arith(ArithOp::Add), Key::Digit(2)]);
        assert_eq!(plus.memory[2], 14.0);

        let divide = run(&state, &[Key::Func(FuncKey::Sto), Key::Arith(ArithOp::Div), Key::Digit(2)]);
        assert_eq!(divide.memory[2], 2.5);

        let mut zero = with_stack([0.0; 4]);
        zero.memory[2] = 10.0;
        let unchanged =
            run(&zero, &[Key::Func(FuncKey::Sto), Key::Arith(ArithOp::Div), Key::Digit(2)]);
        assert_eq!(unchanged.memory[2], 10.0);
    }

    #[test]
    fn test_pending_sequence_cancel_swallows_key() {
        let state = with_stack([3.0, 4.0, 0.0, 0.0]);
        let state = run(&state, &[Key::Func(FuncKey::Sto), Key::Enter]);
        assert!(state.pending.is_none());
        assert_eq!(state.stack.as_array(), [3.0, 4.0, 0.0, 0.0]);
        assert_eq!(state.memory, [0.0; MEMORY_REGISTERS]);
    }

    #[test]
    fn test_modifier_toggles() {
        let state = run(&CalculatorState::new(), &[F]);
        assert_eq!(state.modifier, Modifier::F);
        assert_eq!(run(&state, &[F]).modifier, Modifier::None);
        assert_eq!(run(&state, &[G]).modifier, Modifier::G);
        assert_eq!(run(&state, &[Key::Unmapped]).modifier, Modifier::None);
    }

    #[test]
    fn test_power_off_ignores_keys() {
        let off = run(&with_stack([5.0, 0.0, 0.0, 0.0]), &[Key::Power]);
        assert!(!off.power_on);
        assert_eq!(off.display, "");
        let still_off = run(&off, &keys("123"));
        assert_eq!(still_off, off);

        let on = run(&still_off, &[Key::Power]);
        assert!(on.power_on);
        assert_eq!(on.display, "5.00");
    }

    #[test]
    fn test_fix_and_sci() {
        let state = with_stack([1234.5678, 0.0, 0.0, 0.0]);
        let state = run(&state, &[F, Key::Digit(4)]);
        assert_eq!(state.display, "1,234.5678");
        let state = run(&state, &[F, Key::Dot]);
        assert_eq!(state.display, "1.2346e3");
        assert_eq!(state.modifier, Modifier::None);
    }

    #[test]
    fn test_tvm_store_and_solve() {
        let mut state = CalculatorState::new();
        for (value, register) in [
            ("360", FinRegister::N),
            ("0.5", FinRegister::I),
            ("100000", FinRegister::Pv),
        ] {
            state = typed(&state, value);
            state = run(&state, &[Key::Fin(register)]);
        }
        assert_eq!(state.financial.n, 360.0);
        assert_eq!(state.financial.i, 0.5);

        let state = run(&state, &[Key::Fin(FinRegister::Pmt)]);
        assert!((state.stack.x() + 599.5505).abs() < 1e-3);
        assert_eq!(state.financial.pmt, state.stack.x());
    }

    #[test]
    fn test_sigma_plus_and_mean() {
        let mut state = CalculatorState::new();
        for (y, x) in [("10", "2"), ("20", "4")] {
            state = typed(&state, y);
            state = run(&state, &[Key::Enter]);
            state = typed(&state, x);
            state = run(&state, &[Key::Func(FuncKey::SigmaPlus)]);
        }
        assert_eq!(state.stats.n, 2);
        assert_eq!(state.display, "2");

        let mean = run(&state, &[G, Key::Digit(0)]);
        assert_eq!(mean.stack.as_array(), [3.0, 15.0, 4.0, 20.0]);

        let deviation = run(&state, &[G, Key::Dot]);
        assert!((deviation.stack.x() - 2.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(deviation.stack.as_array()[1..], [3.0, 4.0, 20.0]);
    }

    #[test]
    fn test_sigma_minus_key() {
        let mut state = with_stack([2.0, 10.0, 7.0, 8.0]);
        state.stats.accumulate(2.0, 10.0);

        let removed = run(&state, &[G, Key::Func(FuncKey::SigmaPlus)]);
        assert_eq!(removed.stats.n, 0);
        assert_eq!(removed.stats.sum_x, 0.0);
        assert_eq!(removed.stack.as_array(), [0.0, 2.0, 10.0, 7.0]);
        assert_eq!(removed.display, "0");
        assert_eq!(removed.last_x, 2.0);

        // Not floored: removing from an empty accumulator goes negative
        let again = CalculatorState {
            stack: Stack::from_array([2.0, 10.0, 7.0, 8.0]),
            ..removed
        };
        let negative = run(&again, &[G, Key::Func(FuncKey::SigmaPlus)]);
        assert_eq!(negative.stats.n, -1);
        assert_eq!(negative.display, "-1");
    }

    #[test]
    fn test_mean_without_samples_is_error_two() {
        let state = run(&CalculatorState::new(), &[G, Key::Digit(0)]);
        assert_eq!(state.error, Some(CalcError::InsufficientStatistics));
        assert_eq!(state.modifier, Modifier::None);
    }

    #[test]
    fn test_cash_flow_keys() {
        let mut state = CalculatorState::new();
        state = typed(&state, "1000");
        state = run(&state, &[Key::Chs, G, Key::Fin(FinRegister::Pv)]);
        assert_eq!(state.financial.pv, -1000.0);
        assert_eq!(state.stack.as_array(), [-1000.0, -1000.0, 0.0, 0.0]);
        state = typed(&state, "300");
        state = run(&state, &[G, Key::Fin(FinRegister::Pmt)]);
        assert_eq!(state.display, "1");
        state = typed(&state, "5");
        state = run(&state, &[G, Key::Fin(FinRegister::Fv)]);
        assert_eq!(state.display, "5");
        assert_eq!(state.cash_flows.entries()[1].count, 5);

        let state = run(&state, &[F, Key::Fin(FinRegister::Fv)]);
        assert!((state.stack.x() - 15.238237).abs() < 1e-5);
        assert_eq!(state.financial.i, state.stack.x());
    }

    #[test]
    fn test_irr_without_flows_is_error_seven() {
        let state = run(&CalculatorState::new(), &[F, Key::Fin(FinRegister::Fv)]);
        assert_eq!(state.error, Some(CalcError::IrrNotFound));
    }

    #[test]
    fn test_date_keys() {
        // 3.152024 (15 March 2024) plus 30 days in MDY
        let state = with_stack([30.0, 3.152024, 0.0, 0.0]);
        let state = run(&state, &[G, Key::Chs]);
        assert!((state.stack.x() - 4.142024).abs() < 1e-9);
        assert_eq!(state.stack.y(), 7.0);
        assert_eq!(state.display, "4.14 7");

        // The date follows the display settings
        let mut six = with_stack([30.0, 3.152024, 0.0, 0.0]);
        six.decimals = 6;
        let six = run(&six, &[G, Key::Chs]);
        assert_eq!(six.display, "4.142024 7");

        // ΔDYS pushes the day count
        let state = with_stack([4.142024, 3.152024, 9.0, 0.0]);
        let state = run(&state, &[G, Key::Func(FuncKey::Eex)]);
        assert_eq!(state.stack.as_array(), [30.0, 4.142024, 3.152024, 9.0]);
    }

    #[test]
    fn test_invalid_date_is_error_eight() {
        let state = with_stack([10.0, 2.302024, 0.0, 0.0]);
        let state = run(&state, &[G, Key::Chs]);
        assert_eq!(state.error, Some(CalcError::InvalidDate));
    }

    #[test]
    fn test_depreciation_year_out_of_range() {
        let mut state = with_stack([6.0, 0.0, 0.0, 0.0]);
        state.financial.n = 5.0;
        state.financial.pv = 1000.0;
        let state = run(&state, &[F, Key::Func(FuncKey::PercentTotal)]);
        assert_eq!(state.error, Some(CalcError::InvalidFinancialInput));
    }

    #[test]
    fn test_g_functions_push_result() {
        let mut state = with_stack([16.0, 1.0, 2.0, 3.0]);
        state.last_x = 5.0;
        let root = run(&state, &[G, Key::Func(FuncKey::Power)]);
        assert_eq!(root.stack.as_array(), [4.0, 16.0, 1.0, 2.0]);
        assert_eq!(root.last_x, 5.0);

        let squared = run(&state, &[G, Key::Arith(ArithOp::Mul)]);
        assert_eq!(squared.stack.as_array()[..2], [256.0, 16.0]);

        let months = run(&state, &[G, Key::Fin(FinRegister::N)]);
        assert_eq!(months.stack.as_array()[..2], [192.0, 16.0]);
        assert_eq!(months.financial.n, 192.0);

        let last = run(&root, &[G, Key::Arith(ArithOp::Add)]);
        assert_eq!(last.stack.as_array(), [5.0, 4.0, 16.0, 1.0]);
    }

    #[test]
    fn test_g_function_on_typed_entry() {
        let state = typed(&with_stack([1.0, 2.0, 3.0, 4.0]), "9");
        let root = run(&state, &[G, Key::Func(FuncKey::Power)]);
        assert_eq!(root.stack.as_array(), [3.0, 9.0, 2.0, 3.0]);
        assert!(root.input_buffer.is_none());
    }

    #[test]
    fn test_amortization_key() {
        let mut state = with_stack([12.0, 5.0, 6.0, 7.0]);
        state.financial = FinancialRegisters {
            n: 0.0,
            i: 1.0,
            pv: 1000.0,
            pmt: -88.848789,
            fv: 0.0,
        };
        let state = run(&state, &[F, Key::Fin(FinRegister::N)]);
        let [balance, principal, interest, t] = state.stack.as_array();
        assert!(balance.abs() < 1e-4);
        assert!((principal + 1000.0).abs() < 1e-4);
        assert!((interest + 66.1855).abs() < 1e-3);
        assert_eq!(t, 7.0);
        assert_eq!(state.financial.pv, balance);
        assert_eq!(state.financial.n, 12.0);
        assert_eq!(state.display, "0.00");
    }

    #[test]
    fn test_huge_period_counts_are_rejected() {
        let mut state = with_stack([1e16, 0.0, 0.0, 0.0]);
        state.financial.pv = 1000.0;
        state.financial.i = 1.0;
        let amortized = run(&state, &[F, Key::Fin(FinRegister::N)]);
        assert_eq!(amortized.error, Some(CalcError::InvalidFinancialInput));
        assert_eq!(amortized.stack, state.stack);
        assert_eq!(amortized.financial, state.financial);

        state.financial.n = 1e17;
        let depreciated = run(&state, &[F, Key::Func(FuncKey::Percent)]);
        assert_eq!(depreciated.error, Some(CalcError::InvalidFinancialInput));
    }

    #[test]
    fn test_clear_registers() {
        let mut state = with_stack([1.0, 2.0, 3.0, 4.0]);
        state.memory[3] = 9.0;
        state.financial.pv = 5.0;
        state.stats.accumulate(1.0, 2.0);
        state.cash_flows.reset_with(-10.0);
        let state = run(&state, &[F, Key::Clx]);
        assert_eq!(state.stack.as_array(), [0.0; 4]);
        assert_eq!(state.memory, [0.0; MEMORY_REGISTERS]);
        assert_eq!(state.financial, FinancialRegisters::default());
        assert_eq!(state.stats.n, 0);
        assert!(state.cash_flows.is_empty());
    }

    #[test]
    fn test_paste_literal_replaces_entry() {
        let literal = EntryBuffer::from_literal("1234.5").unwrap();
        let state = typed(&CalculatorState::new(), "9");
        let state = run(&state, &[Key::Literal(literal)]);
        assert_eq!(state.input_buffer, Some(literal));
        assert_eq!(state.display, "1234.5_");
    }

    #[test]
    fn test_input_is_never_mutated() {
        let state = typed(&CalculatorState::new(), "8");
        let before = state.clone();
        let _ = transition(&state, Key::Enter, &CalculatorConfig::default());
        assert_eq!(state, before);
    }
}
