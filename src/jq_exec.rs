//! jq pre-processing of data documents (via jaq) before validation.
use anyhow::{anyhow, Context, Result};
use jaq_core::{load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Run `filter_src` over `input`; each jq output becomes one document.
pub fn select_documents(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader.load(&arena, program).map_err(|errs| {
        let details = errs.into_iter().map(|(_, err)| format!("{err:?}"));
        filter_error("parse", filter_src, details)
    })?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| {
            let details = errs
                .into_iter()
                .flat_map(|(_, undefined)| undefined)
                .map(|(name, kind)| format!("undefined `{name}` ({kind:?})"));
            filter_error("compile", filter_src, details)
        })?;

    let inputs = RcIter::new(core::iter::empty());
    let outputs = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut documents = Vec::new();
    for (position, item) in outputs.enumerate() {
        let val = item.map_err(|e| anyhow!("jq runtime error: {e:?}"))?;
        // Val renders as JSON text; round-trip it into serde_json.
        let text = val.to_string();
        let document = serde_json::from_str::<Value>(&text)
            .with_context(|| format!("jq output #{position} is not JSON: {text}"))?;
        documents.push(document);
    }
    Ok(documents)
}

fn filter_error(
    stage: &str,
    filter_src: &str,
    details: impl Iterator<Item = String>,
) -> anyhow::Error {
    let details: Vec<String> = details.collect();
    anyhow!("jq {stage} error in `{filter_src}`: {}", details.join("; "))
}
