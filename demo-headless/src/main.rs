use clap::{Parser, ValueEnum};
use simpleunits_core::{activate, Quantity, UnitResult, UnitfulArray};
use tracing_subscriber::EnvFilter;

/// Unit-aware array arithmetic from the command line
#[derive(Parser, Debug)]
#[command(name = "simpleunits-demo")]
#[command(about = "Evaluate `lhs <op> rhs` with unit propagation", long_about = None)]
struct Args {
    /// Left operand: comma-separated values followed by a unit, e.g. "1,2,3 m"
    #[arg(long, default_value = "1,2,3 m")]
    lhs: String,

    /// Operator to apply
    #[arg(long, value_enum, default_value_t = Op::Add)]
    op: Op,

    /// Right operand: one value is a quantity, several an array along the same dimension
    #[arg(long, default_value = "6378 km")]
    rhs: String,

    /// Rescale products and quotients into plain SI units
    #[arg(long)]
    keep_si: bool,

    /// Convert the result into this unit before printing
    #[arg(long)]
    to: Option<String>,

    /// Normalize the result into SI base units before printing
    #[arg(long)]
    si: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

/// Parsed command-line operand
enum Value {
    Scalar(Quantity),
    Array(UnitfulArray),
}

fn split_operand(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.find(char::is_whitespace) {
        Some(at) => (&text[..at], text[at..].trim()),
        None => (text, ""),
    }
}

fn parse_values(text: &str) -> Result<Vec<f64>, String> {
    text.split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid value '{}': {}", v, e))
        })
        .collect()
}

fn parse_array(text: &str) -> Result<UnitfulArray, String> {
    let (values, units) = split_operand(text);
    Ok(UnitfulArray::from_vec("x", parse_values(values)?, units))
}

fn parse_value(text: &str) -> Result<Value, String> {
    let (values, units) = split_operand(text);
    let values = parse_values(values)?;
    if let [value] = values[..] {
        let quantity = Quantity::with_units(value, units).map_err(|e| e.to_string())?;
        Ok(Value::Scalar(quantity))
    } else {
        Ok(Value::Array(UnitfulArray::from_vec("x", values, units)))
    }
}

fn evaluate(lhs: &UnitfulArray, op: Op, rhs: &Value) -> UnitResult<UnitfulArray> {
    match (op, rhs) {
        (Op::Add, Value::Scalar(q)) => lhs + q,
        (Op::Add, Value::Array(a)) => lhs + a,
        (Op::Sub, Value::Scalar(q)) => lhs - q,
        (Op::Sub, Value::Array(a)) => lhs - a,
        (Op::Mul, Value::Scalar(q)) => lhs * q,
        (Op::Mul, Value::Array(a)) => lhs * a,
        (Op::Div, Value::Scalar(q)) => lhs / q,
        (Op::Div, Value::Array(a)) => lhs / a,
    }
}

fn run(args: &Args) -> Result<(), String> {
    let lhs = parse_array(&args.lhs)?;
    let rhs = parse_value(&args.rhs)?;

    activate(args.keep_si);

    let mut result = evaluate(&lhs, args.op, &rhs).map_err(|e| e.to_string())?;
    if let Some(units) = &args.to {
        result = result.convert_to_unit(units).map_err(|e| e.to_string())?;
    }
    if args.si {
        result = result.normalize_to_si().map_err(|e| e.to_string())?;
    }

    println!("=== Unit Arithmetic Demo ===\n");
    println!("lhs:    {:?} [{}]", lhs.values(), lhs.units().unwrap_or(""));
    println!("op:     {:?}", args.op);
    match &rhs {
        Value::Scalar(q) => println!("rhs:    {}", q),
        Value::Array(a) => println!("rhs:    {:?} [{}]", a.values(), a.units().unwrap_or("")),
    }
    println!("result: {:?} [{}]", result.values(), result.units().unwrap_or(""));
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(message) = run(&args) {
        eprintln!("error: {}", message);
        std::process::exit(1);
    }
}
