//! Task schedule recognizer for the program entry point

use super::intent::Task;
use crate::syntax::{Expression, FunctionDefinition, NameReference};

const ENTRY_POINT: &str = "main";

/// Reads `@cloud:Task { schedule: {...} }` off the `main` function
pub fn recognize_task(function: &FunctionDefinition) -> Option<Task> {
    if function.function_name != ENTRY_POINT {
        return None;
    }

    function
        .metadata
        .as_ref()?
        .annotations
        .iter()
        .filter(|annotation| is_task_annotation(&annotation.annot_reference))
        .filter_map(|annotation| annotation.annot_value.as_ref())
        .flat_map(|value| value.specific_fields())
        .filter(|(name, _)| *name == "schedule")
        .filter_map(|(_, value)| value.and_then(Expression::as_mapping))
        .map(|schedule| {
            let mut task = Task::default();
            for (name, value) in schedule.specific_fields() {
                let text = value.and_then(Expression::string_value);
                match name {
                    "minutes" => task.minutes = text,
                    "hours" => task.hours = text,
                    "dayOfMonth" => task.day_of_month = text,
                    "monthOfYear" => task.month_of_year = text,
                    "daysOfWeek" => task.days_of_week = text,
                    _ => {}
                }
            }
            task
        })
        .last()
}

fn is_task_annotation(reference: &NameReference) -> bool {
    matches!(
        reference,
        NameReference::QualifiedNameReference { module_prefix, identifier }
            if module_prefix == "cloud" && identifier == "Task"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(yaml: &str) -> FunctionDefinition {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_minutes_and_hours_only() {
        let task = recognize_task(&function(
            r#"
function_name: main
metadata:
  annotations:
    - annot_reference: { kind: qualified_name_reference, module_prefix: cloud, identifier: Task }
      annot_value:
        fields:
          - kind: specific_field
            field_name: { kind: identifier_token, text: schedule }
            value:
              kind: mapping_constructor
              fields:
                - kind: specific_field
                  field_name: { kind: identifier_token, text: minutes }
                  value: { kind: string_literal, text: "\"0\"" }
                - kind: specific_field
                  field_name: { kind: identifier_token, text: hours }
                  value: { kind: string_literal, text: "\"2\"" }
"#,
        ))
        .unwrap();

        assert_eq!(task.minutes.as_deref(), Some("0"));
        assert_eq!(task.hours.as_deref(), Some("2"));
        assert_eq!(task.day_of_month, None);
        assert_eq!(task.month_of_year, None);
        assert_eq!(task.days_of_week, None);
    }

    #[test]
    fn test_unknown_fields_and_non_strings_are_ignored() {
        let task = recognize_task(&function(
            r#"
function_name: main
metadata:
  annotations:
    - annot_reference: { kind: qualified_name_reference, module_prefix: cloud, identifier: Task }
      annot_value:
        fields:
          - kind: specific_field
            field_name: { kind: identifier_token, text: schedule }
            value:
              kind: mapping_constructor
              fields:
                - kind: specific_field
                  field_name: { kind: identifier_token, text: seconds }
                  value: { kind: string_literal, text: "\"30\"" }
                - kind: specific_field
                  field_name: { kind: identifier_token, text: daysOfWeek }
                  value: { kind: numeric_literal, text: "1" }
                - kind: specific_field
                  field_name: { kind: identifier_token, text: monthOfYear }
                  value: { kind: string_literal, text: "\"*/2\"" }
"#,
        ))
        .unwrap();

        assert_eq!(task.days_of_week, None);
        assert_eq!(task.month_of_year.as_deref(), Some("*/2"));
        assert_eq!(task.schedule(), "* * * */2 *");
    }

    #[test]
    fn test_other_functions_are_ignored() {
        let task = recognize_task(&function(
            r#"
function_name: worker
metadata:
  annotations:
    - annot_reference: { kind: qualified_name_reference, module_prefix: cloud, identifier: Task }
      annot_value:
        fields:
          - kind: specific_field
            field_name: { kind: identifier_token, text: schedule }
            value: { kind: mapping_constructor, fields: [] }
"#,
        ));
        assert!(task.is_none());
    }

    #[test]
    fn test_other_annotations_are_ignored() {
        let task = recognize_task(&function(
            r#"
function_name: main
metadata:
  annotations:
    - annot_reference: { kind: qualified_name_reference, module_prefix: cloud, identifier: Expose }
      annot_value:
        fields:
          - kind: specific_field
            field_name: { kind: identifier_token, text: schedule }
            value: { kind: mapping_constructor, fields: [] }
    - annot_reference: { kind: simple_name_reference, name: Task }
"#,
        ));
        assert!(task.is_none());
    }

    #[test]
    fn test_main_without_metadata() {
        assert!(recognize_task(&function("function_name: main")).is_none());
    }
}
