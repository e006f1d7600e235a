//! Aggregation of outcomes into a report
//!
//! Outcomes arrive in whatever order the workers finished. The report puts
//! them back into declaration order: specifications as registered, examples
//! as declared, should-blocks as evaluated.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::outcome::Outcome;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub started_at: DateTime<Utc>,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    /// Number of outcomes, passing or not
    pub total: usize,
    pub failed: usize,
    pub specs: Vec<SpecReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpecReport {
    pub subject: String,
    pub examples: Vec<ExampleReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExampleReport {
    pub description: String,
    pub outcomes: Vec<Outcome>,
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

impl Report {
    pub fn aggregate(outcomes: Vec<Outcome>, started_at: DateTime<Utc>, elapsed: Duration) -> Self {
        let total = outcomes.len();
        let failed = outcomes.iter().filter(|outcome| outcome.failed()).count();

        let mut grouped: BTreeMap<usize, (String, BTreeMap<usize, ExampleReport>)> =
            BTreeMap::new();
        for outcome in outcomes {
            let id = &outcome.example;
            let (_, examples) = grouped
                .entry(id.spec_index)
                .or_insert_with(|| (id.subject.clone(), BTreeMap::new()));
            examples
                .entry(id.example_index)
                .or_insert_with(|| ExampleReport {
                    description: id.description.clone(),
                    outcomes: Vec::new(),
                })
                .outcomes
                .push(outcome);
        }

        let specs = grouped
            .into_values()
            .map(|(subject, examples)| SpecReport {
                subject,
                examples: examples.into_values().collect(),
            })
            .collect();

        debug!(total, failed, "aggregated report");
        Report {
            started_at,
            elapsed,
            total,
            failed,
            specs,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Failing outcomes in declaration order
    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.specs
            .iter()
            .flat_map(|spec| &spec.examples)
            .flat_map(|example| &example.outcomes)
            .filter(|outcome| outcome.failed())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for spec in &self.specs {
            let mut header_written = false;
            for example in &spec.examples {
                for outcome in &example.outcomes {
                    let Some(cause) = &outcome.cause else {
                        continue;
                    };
                    if !header_written {
                        writeln!(f, "Spec of {}", spec.subject)?;
                        header_written = true;
                    }
                    writeln!(
                        f,
                        "  {} fails to verify that it {}",
                        example.description, outcome.description
                    )?;
                    for line in cause.to_string().lines() {
                        writeln!(f, "    {}", line)?;
                    }
                }
            }
        }
        writeln!(f)?;
        writeln!(f, "Finished in {:.3} seconds.", self.elapsed.as_secs_f64())?;
        write!(f, "Among {} report(s), {} failed.", self.total, self.failed)
    }
}
