use anyhow::{anyhow, Context, Result};
use jaq_core::{load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Run a jq filter over one input document and collect every output.
/// Used to carve a routes document out of a larger export.
pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(|errs| filter_error(filter_src, "parse", errs.into_iter().map(|(_, e)| format!("{e:?}"))))?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| {
            let undefined = errs.into_iter()
                .flat_map(|(_, list)| list)
                .map(|(name, undef)| format!("undefined `{name}`: {undef:?}"));
            filter_error(filter_src, "compile", undefined)
        })?;

    let inputs = RcIter::new(core::iter::empty());
    let out = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut values = Vec::new();
    for item in out {
        let v = item.map_err(|e| anyhow!(format!("{e:?}")))?;
        // Val → JSON text → serde_json; Val has no direct conversion back
        let value = serde_json::from_str::<Value>(&v.to_string())
            .with_context(|| format!("jq produced non-JSON output: {v}"))?;
        values.push(value);
    }
    Ok(values)
}

/// One error for a filter that failed to load or compile. Every problem
/// goes on its own line under the filter text.
fn filter_error(filter_src: &str, stage: &str, problems: impl IntoIterator<Item = String>) -> anyhow::Error {
    let mut msg = format!("jq filter `{filter_src}` failed to {stage}");
    for problem in problems {
        msg.push_str("\n  ");
        msg.push_str(&problem);
    }
    anyhow!(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selects_routes_from_export() {
        let export = json!({ "service": "shop", "api": { "routes": [{ "method": "GET", "path": "/a" }] } });
        let out = run_jaq(".api", &export).unwrap();
        assert_eq!(out, vec![json!({ "routes": [{ "method": "GET", "path": "/a" }] })]);
    }

    #[test]
    fn multiple_outputs_are_kept_in_order() {
        let out = run_jaq(".[]", &json!([1, 2, 3])).unwrap();
        assert_eq!(out, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn bad_filter_is_an_error() {
        let err = run_jaq(".[", &json!({})).unwrap_err().to_string();
        assert!(err.starts_with("jq filter `.[` failed to parse"), "{err}");
    }

    #[test]
    fn unknown_function_names_the_filter() {
        let err = run_jaq("no_such_fn(1)", &json!({})).unwrap_err().to_string();
        assert!(err.starts_with("jq filter `no_such_fn(1)` failed to compile"), "{err}");
        assert!(err.contains("undefined `no_such_fn`"), "{err}");
    }
}
