use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Print a success message, merging `data` into the JSON object in JSON mode
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&success_json(message, data))?),
        OutputFormat::Text => println!("✓ {}", message),
    }
    Ok(())
}

/// Print an error message in the selected format
pub fn output_error(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "success": false, "error": message }))?
        ),
        OutputFormat::Text => eprintln!("Error: {}", message),
    }
    Ok(())
}

fn success_json(message: &str, data: Option<Value>) -> Value {
    let mut response = json!({
        "success": true,
        "message": message
    });

    if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
        target.extend(extra);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_object_data() {
        let value = success_json("done", Some(json!({"database": "ok"})));
        assert_eq!(value, json!({"success": true, "message": "done", "database": "ok"}));
    }

    #[test]
    fn ignores_non_object_data() {
        let value = success_json("done", Some(json!([1, 2])));
        assert_eq!(value, json!({"success": true, "message": "done"}));
    }
}
