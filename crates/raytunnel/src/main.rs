mod run;

use anyhow::Result;

fn main() -> Result<()> {
    run::initialise_tracing();
    run::run()
}
