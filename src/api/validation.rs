// Body validation rules applied before a request reaches the service

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::api::errors::FieldViolation;
use crate::services::{TeamPartialUpdateRequest, TeamRequest};

const NOT_BLANK: &str = "must not be blank";
const NOT_NULL: &str = "must not be null";

/// Request body constraints
pub trait Validate {
    /// Returns every violated field, in declaration order
    fn validate(&self) -> Result<(), Vec<FieldViolation>>;
}

fn violation(field: impl Into<String>, rejected_value: Value, message: &str) -> FieldViolation {
    FieldViolation {
        field: field.into(),
        rejected_value,
        message: message.to_string(),
    }
}

fn text_value(value: Option<&String>) -> Value {
    value.map_or(Value::Null, |text| Value::String(text.clone()))
}

/// Budgets are echoed back as JSON numbers, like the responses
fn decimal_value(value: Decimal) -> Value {
    value.to_f64().map_or(Value::Null, Value::from)
}

fn is_blank(value: Option<&String>) -> bool {
    value.map_or(true, |text| text.trim().is_empty())
}

fn finish(violations: Vec<FieldViolation>) -> Result<(), Vec<FieldViolation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

impl Validate for TeamRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();

        if is_blank(self.name.as_ref()) {
            violations.push(violation("name", text_value(self.name.as_ref()), NOT_BLANK));
        }
        if is_blank(self.acronym.as_ref()) {
            violations.push(violation("acronym", text_value(self.acronym.as_ref()), NOT_BLANK));
        }
        match self.budget {
            None => violations.push(violation("budget", Value::Null, NOT_NULL)),
            Some(budget) if budget <= Decimal::ZERO => violations.push(violation(
                "budget",
                decimal_value(budget),
                "must be greater than 0",
            )),
            Some(_) => {}
        }

        for (index, player) in self.players.iter().flatten().enumerate() {
            if is_blank(player.name.as_ref()) {
                violations.push(violation(
                    format!("players[{index}].name"),
                    text_value(player.name.as_ref()),
                    NOT_BLANK,
                ));
            }
            if player.position.is_none() {
                violations.push(violation(
                    format!("players[{index}].position"),
                    Value::Null,
                    NOT_NULL,
                ));
            }
        }

        finish(violations)
    }
}

impl Validate for TeamPartialUpdateRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();

        // Absent fields are left alone; only present ones are constrained
        if let Some(name) = &self.name {
            if name.chars().count() < 2 {
                violations.push(violation(
                    "name",
                    Value::String(name.clone()),
                    "size must be at least 2",
                ));
            }
        }
        if let Some(budget) = self.budget {
            if budget < Decimal::ZERO {
                violations.push(violation(
                    "budget",
                    decimal_value(budget),
                    "must be greater than or equal to 0",
                ));
            }
        }

        finish(violations)
    }
}
