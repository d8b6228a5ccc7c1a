use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const STANDARD_HOURS_PER_DAY: f64 = 8.0;
pub const DEFAULT_OVERTIME_RATE: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Display, Error)]
pub enum PayrollError {
    #[display(fmt = "month has no working days")]
    NoWorkingDays,

    #[display(fmt = "{} must not be negative (got {})", field, value)]
    NegativeAmount { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayrollInput {
    pub base_salary: f64,
    pub total_working_days: u32,
    pub working_days: u32,
    pub overtime_hours: f64,
    pub overtime_rate: f64,
    pub bonus: f64,
    pub deductions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollLine {
    #[schema(example = 47727.27)]
    pub prorated_salary: f64,
    #[schema(example = 1704.55)]
    pub overtime_salary: f64,
    #[schema(example = 5000.0)]
    pub bonus: f64,
    #[schema(example = 2000.0)]
    pub deductions: f64,
    #[schema(example = 52431.82)]
    pub net_salary: f64,
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, PayrollError> {
    if value < 0.0 || value.is_nan() {
        return Err(PayrollError::NegativeAmount { field, value });
    }
    Ok(value)
}

/// Salary is prorated on days actually worked; days beyond the month's
/// business days do not raise it past the base salary.
pub fn calculate_payroll(input: &PayrollInput) -> Result<PayrollLine, PayrollError> {
    if input.total_working_days == 0 {
        return Err(PayrollError::NoWorkingDays);
    }

    let base_salary = non_negative("base_salary", input.base_salary)?;
    let overtime_hours = non_negative("overtime_hours", input.overtime_hours)?;
    let overtime_rate = non_negative("overtime_rate", input.overtime_rate)?;
    let bonus = non_negative("bonus", input.bonus)?;
    let deductions = non_negative("deductions", input.deductions)?;

    let total_days = f64::from(input.total_working_days);
    let worked_days = f64::from(input.working_days.min(input.total_working_days));

    let prorated_salary = base_salary * worked_days / total_days;
    let hourly_rate = base_salary / (total_days * STANDARD_HOURS_PER_DAY);
    let overtime_salary = overtime_hours * hourly_rate * overtime_rate;

    Ok(PayrollLine {
        prorated_salary: round_cents(prorated_salary),
        overtime_salary: round_cents(overtime_salary),
        bonus,
        deductions,
        net_salary: round_cents(prorated_salary + overtime_salary + bonus - deductions),
    })
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> PayrollInput {
        PayrollInput {
            base_salary: 22_000.0,
            total_working_days: 22,
            working_days: 22,
            overtime_hours: 0.0,
            overtime_rate: DEFAULT_OVERTIME_RATE,
            bonus: 0.0,
            deductions: 0.0,
        }
    }

    #[test]
    fn test_full_month() {
        let line = calculate_payroll(&input()).unwrap();
        assert_eq!(line.prorated_salary, 22_000.0);
        assert_eq!(line.net_salary, 22_000.0);
    }

    #[test]
    fn test_prorated_with_overtime_bonus_and_deductions() {
        let line = calculate_payroll(&PayrollInput {
            working_days: 11,
            overtime_hours: 4.0,
            bonus: 500.0,
            deductions: 200.0,
            ..input()
        })
        .unwrap();

        // hourly = 22000 / (22 * 8) = 125; overtime = 4 * 125 * 1.5
        assert_eq!(line.prorated_salary, 11_000.0);
        assert_eq!(line.overtime_salary, 750.0);
        assert_eq!(line.net_salary, 11_000.0 + 750.0 + 500.0 - 200.0);
    }

    #[test]
    fn test_extra_days_do_not_exceed_base() {
        let line = calculate_payroll(&PayrollInput {
            working_days: 25,
            ..input()
        })
        .unwrap();
        assert_eq!(line.prorated_salary, 22_000.0);
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert_eq!(
            calculate_payroll(&PayrollInput {
                total_working_days: 0,
                ..input()
            }),
            Err(PayrollError::NoWorkingDays)
        );
        assert!(matches!(
            calculate_payroll(&PayrollInput {
                bonus: -1.0,
                ..input()
            }),
            Err(PayrollError::NegativeAmount { field: "bonus", .. })
        ));
    }
}
