use std::collections::BTreeMap;

use tera::{Context, Value};

pub fn build_context(variables: &BTreeMap<String, Value>) -> Context {
    let mut context = Context::new();
    for (key, value) in variables {
        context.insert(key, value);
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_values_are_reachable() {
        let mut variables = BTreeMap::new();
        variables.insert("name".to_string(), Value::String("blossom".into()));
        variables.insert(
            "build".to_string(),
            serde_json::json!({ "version": "2.1.0", "snapshot": false }),
        );

        let context = build_context(&variables);
        let rendered = tera::Tera::one_off(
            "{{ name }} {{ build.version }} {{ build.snapshot }}",
            &context,
            false,
        )
        .unwrap();
        assert_eq!(rendered, "blossom 2.1.0 false");
    }
}
