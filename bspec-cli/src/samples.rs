//! Sample specifications bundled with `bspec run`

use std::collections::{BTreeMap, BTreeSet};

use bspec_assert::Node;
use bspec_descriptor::ClosureDescriptor;
use bspec_engine::{given, SpecSuite, Subject};

#[derive(Debug)]
struct Person {
    name: String,
    age: u32,
}

pub fn sample_suite() -> SpecSuite {
    let mut suite = SpecSuite::new();

    suite.describe(Subject::of::<Vec<String>>(), |it| {
        given("an empty list", move || {
            let list: Vec<String> = Vec::new();

            it.should("has a size == 0", |verify| {
                verify.that(&list).size().is_equal_to(0);
                Ok(())
            })?;
            Ok(())
        })?;

        given("a list of one element", move || {
            let list = vec!["hello".to_string()];

            it.should("has a size == 1", |verify| {
                verify.that(&list).size().is_equal_to(1);
                Ok(())
            })?;
            it.should("gets the item at index 0", |verify| {
                verify.that(&list).get(0)?.is_equal_to("hello");
                Ok(())
            })?;
            it.should("returns -1 as the index of an item not present", |verify| {
                verify.that(&list).index_of("not hello").is_equal_to(-1);
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(())
    });

    suite.describe(Subject::of::<BTreeSet<String>>(), |it| {
        given("a set with one element", move || {
            let set: BTreeSet<String> = ["hello".to_string()].into_iter().collect();

            it.should("has the element first", |verify| {
                verify.that(&set).first()?.is_equal_to("hello");
                Ok(())
            })?;
            it.should("has the element last", |verify| {
                verify.that(&set).last()?.is_equal_to("hello");
                Ok(())
            })?;
            it.should("has a first element less than zzzzz", |verify| {
                verify.that(&set).first()?.is_less_than("zzzzz");
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(())
    });

    suite.describe(Subject::of::<BTreeMap<String, u32>>(), |it| {
        given("a map of ages", move || {
            let ages: BTreeMap<String, u32> = [("ada".to_string(), 36), ("grace".to_string(), 85)]
                .into_iter()
                .collect();

            it.should("has two entries", |verify| {
                verify.that(&ages).size().is_equal_to(2);
                verify.that(&ages).contains_key("ada");
                Ok(())
            })?;
            it.should("orders its keys", |verify| {
                verify.that(&ages).first_entry()?.key().is_equal_to("ada");
                verify.that(&ages).last_entry()?.value().is_in_range(80, 90);
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(())
    });

    suite.describe("Person", |it| {
        given("a person", move || {
            let person = Person {
                name: "Ada".to_string(),
                age: 36,
            };
            let name_accessor = ClosureDescriptor::builder("name")
                .signature("()")
                .impl_class("Person")
                .encode()?;

            it.should("exposes its name", |verify| {
                verify
                    .object(&person)
                    .extract_described(&name_accessor, |person| person.name.as_str())?
                    .is_equal_to("Ada");
                Ok(())
            })?;
            it.should("is an adult", |verify| {
                verify
                    .object(&person)
                    .extract("age", |person| person.age)
                    .is_greater_or_equal_to(18);
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(())
    });

    suite
}

#[cfg(test)]
mod tests {
    use bspec_engine::{RunnerConfig, SilentReporter, SpecRunner};

    use super::*;

    #[test]
    fn test_samples_pass() {
        let runner = SpecRunner::new(RunnerConfig {
            num_threads: 2,
            ..RunnerConfig::default()
        })
        .unwrap();
        let report = runner.run_suite(&sample_suite(), &SilentReporter).unwrap();

        assert!(report.is_success(), "{}", report);
        assert_eq!(report.total, 11);
        let subjects: Vec<_> = report.specs.iter().map(|spec| spec.subject.as_str()).collect();
        assert_eq!(
            subjects,
            vec!["Vec<String>", "BTreeSet<String>", "BTreeMap<String, u32>", "Person"]
        );
    }
}
