use battleships_competition::prelude::*;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = Configuration::from_env();
    let constraints = ConstraintsBuilder::from_env().build()?;
    let competition = Competition::new(config, constraints)?;

    for (name, ai) in [
        ("Sweeper", factory(SweepAi::new)),
        ("Random", factory(RandomAi::new)),
    ] {
        let enrollment = competition.add(name, ai);
        info!(
            entry = %enrollment.entry.name,
            games = enrollment.report.completed(),
            "entry added"
        );
    }

    println!("{}", serde_json::to_string_pretty(&competition.entries())?);
    Ok(())
}
