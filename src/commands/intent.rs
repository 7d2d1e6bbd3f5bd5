//! Intent command: show how a query is understood

use anyhow::Result;

use crate::config::RuntimeContext;
use crate::intent::{analyze, Intent};
use crate::output::output_for_format;

pub fn run(ctx: &RuntimeContext, query: &[String]) -> Result<()> {
    let query = query.join(" ");
    let intent = analyze(&query);

    output_for_format(ctx, &intent, || {
        println!("{}", describe(&intent));
        Ok(())
    })
}

fn describe(intent: &Intent) -> String {
    match intent {
        Intent::Vague => "Vague: no real preference, top rated hotels will be shown".to_string(),
        Intent::Preferences(p) if p.is_empty() => {
            "No recognized preferences: the query will be matched fuzzily".to_string()
        }
        Intent::Preferences(p) => p.describe(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        assert!(describe(&analyze("lo que sea")).starts_with("Vague"));
        assert!(describe(&analyze("hotel caribe")).starts_with("type: hotel"));
        assert!(describe(&analyze("caribe")).starts_with("No recognized"));
    }
}
