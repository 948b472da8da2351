use clap::Args;
use serde_json::Value;

use finplan_core::premium_tax_credit::calculator::{self, PtcInputs};

use crate::input;

#[derive(Args)]
pub struct PtcArgs {
    /// JSON input file; piped stdin is read when omitted
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_ptc(args: PtcArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: PtcInputs = input::read_typed(&args.input, "premium tax credit")?;
    let result = calculator::calculate_ptc(&input)?;
    Ok(serde_json::to_value(result)?)
}
