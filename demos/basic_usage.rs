// ============================================================================
// Basic Usage Example
// ============================================================================

use rpn_financial::prelude::*;
use std::sync::Arc;

fn type_number(calc: &mut Calculator, text: &str) {
    for c in text.chars() {
        let key = match c.to_digit(10) {
            Some(d) => Key::Digit(d as u8),
            None => Key::Dot,
        };
        calc.press(key);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Financial RPN Calculator Example ===\n");

    let mut calc = Calculator::new(CalculatorConfig::default(), Arc::new(LoggingEventHandler));

    // 1000 ENTER 12 ×
    println!("Chain arithmetic...");
    type_number(&mut calc, "1000");
    calc.press(Key::Enter);
    type_number(&mut calc, "12");
    calc.press(Key::Arith(ArithOp::Mul));
    println!("  1000 ENTER 12 x = {}", calc.display());

    // 30-year mortgage: 360 n, 0.5 i, 250000 PV, solve PMT
    println!("\n=== Mortgage Payment ===");
    calc.press_all([Key::Shift(Modifier::F), Key::Clx]);
    for (text, register) in [
        ("360", FinRegister::N),
        (".5", FinRegister::I),
        ("250000", FinRegister::Pv),
    ] {
        type_number(&mut calc, text);
        calc.press(Key::Fin(register));
    }
    calc.press(Key::Fin(FinRegister::Pmt));
    println!("  PMT = {}", calc.display());

    // First year of amortization: 12 f n
    type_number(&mut calc, "12");
    calc.press_all([Key::Shift(Modifier::F), Key::Fin(FinRegister::N)]);
    let [balance, principal, interest, _] = calc.state().stack.as_array();
    println!("  Year 1 interest:  {interest:.2}");
    println!("  Year 1 principal: {principal:.2}");
    println!("  Balance:          {balance:.2}");

    // Cash flows: -1000 CF0, 300 CFj x5, IRR
    println!("\n=== Internal Rate of Return ===");
    type_number(&mut calc, "1000");
    calc.press_all([Key::Chs, Key::Shift(Modifier::G), Key::Fin(FinRegister::Pv)]);
    type_number(&mut calc, "300");
    calc.press_all([Key::Shift(Modifier::G), Key::Fin(FinRegister::Pmt)]);
    type_number(&mut calc, "5");
    calc.press_all([Key::Shift(Modifier::G), Key::Fin(FinRegister::Fv)]);
    calc.press_all([Key::Shift(Modifier::F), Key::Fin(FinRegister::Fv)]);
    println!("  IRR = {} %", calc.display());

    // Errors are shown until the next key
    println!("\n=== Errors ===");
    calc.press(Key::Clx);
    let events = calc.press(Key::Func(FuncKey::Reciprocal));
    for event in &events {
        if let CalculatorEvent::ErrorRaised { key_id, error, .. } = event {
            println!("  {key_id} raised {error}");
        }
    }
    println!("  Display: {}", calc.display());

    // Snapshot for a front end
    let snapshot = calc.snapshot();
    println!("\n=== Snapshot ===");
    println!("  Stack: {:?}", snapshot.stack);
    println!("  Display: {}", snapshot.display);

    #[cfg(feature = "serde")]
    {
        let store = MemoryStateStore::new();
        if calc.save_to(&store).is_ok() {
            let bytes = store.record().map_or(0, |record| record.len());
            println!("\nSaved state record: {bytes} bytes");
        }
    }
}
