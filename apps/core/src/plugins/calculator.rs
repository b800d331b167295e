use crate::model::ResultItem;
use crate::plugin::{Plugin, PluginError};

/// Arithmetic evaluation. The result row's payload holds the bare value so
/// activating it copies something pasteable.
pub struct CalculatorPlugin;

impl Plugin for CalculatorPlugin {
    fn name(&self) -> &'static str {
        "Calculator"
    }

    fn description(&self) -> &'static str {
        "Evaluate arithmetic expressions"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["c"]
    }

    fn execute(&self, query: &str) -> Result<Vec<ResultItem>, PluginError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let expr = normalize_operators(trimmed);
        match meval::eval_str(&expr) {
            Ok(value) if value.is_finite() => {
                let rendered = render_number(value);
                Ok(vec![ResultItem::plugin_result(
                    format!("= {rendered}"),
                    rendered,
                )])
            }
            _ => Ok(vec![ResultItem::plugin_error("Invalid expression")]),
        }
    }
}

/// Accept the multiplication and division signs people actually type.
fn normalize_operators(expr: &str) -> String {
    expr.chars()
        .map(|c| match c {
            'x' | 'X' | '×' => '*',
            '÷' => '/',
            _ => c,
        })
        .collect()
}

fn render_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::CalculatorPlugin;
    use crate::model::ResultKind;
    use crate::plugin::Plugin;

    #[test]
    fn integral_results_render_without_fraction() {
        let items = CalculatorPlugin.execute("2+2").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].payload, "4");
        assert_eq!(items[0].title, "= 4");
        assert_eq!(items[0].kind, ResultKind::PluginResult);
    }

    #[test]
    fn fractional_results_keep_their_decimals() {
        let items = CalculatorPlugin.execute("7/2").unwrap();
        assert_eq!(items[0].payload, "3.5");
    }

    #[test]
    fn x_is_accepted_as_multiplication() {
        let items = CalculatorPlugin.execute("3x3").unwrap();
        assert_eq!(items[0].payload, "9");
    }

    #[test]
    fn caret_is_exponentiation() {
        let items = CalculatorPlugin.execute("2^10").unwrap();
        assert_eq!(items[0].payload, "1024");
    }

    #[test]
    fn garbage_becomes_a_visible_error_row() {
        let items = CalculatorPlugin.execute("what is this").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, ResultKind::PluginError);
    }

    #[test]
    fn blank_input_yields_nothing() {
        assert!(CalculatorPlugin.execute("   ").unwrap().is_empty());
    }

    #[test]
    fn division_by_zero_is_not_a_result() {
        let items = CalculatorPlugin.execute("1/0").unwrap();
        assert_eq!(items[0].kind, ResultKind::PluginError);
    }
}
