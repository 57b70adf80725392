//! Predicate compiler: renders an [`Expr`] tree as SQL expression text.
//!
//! The top-level result carries no outer parentheses. Every composite
//! sub-expression parenthesizes its operands, so the text is unambiguous
//! whatever the nesting.

use tracing::trace;

use crate::dialect::{FormatLiteral, QuoteIdentifier, array_literal};
use crate::error::CompilationError;
use crate::expr::Expr;
use crate::literal::Literal;

/// Always false: an empty IN list can never match.
const EMPTY_IN: &str = "0 = 1";
/// Always true: an empty NOT IN list always matches.
const EMPTY_NOT_IN: &str = "1 = 1";

/// Compiles `expr` with the given quoting and literal formatting.
pub fn compile_predicate<Q, F>(
    expr: &Expr,
    quote: &Q,
    format: &F,
) -> Result<String, CompilationError>
where
    Q: QuoteIdentifier + ?Sized,
    F: FormatLiteral + ?Sized,
{
    let sql = PredicateCompiler { quote, format }.compile(expr)?;
    trace!(predicate = %sql, "Compiled predicate");
    Ok(sql)
}

struct PredicateCompiler<'a, Q: ?Sized, F: ?Sized> {
    quote: &'a Q,
    format: &'a F,
}

impl<Q, F> PredicateCompiler<'_, Q, F>
where
    Q: QuoteIdentifier + ?Sized,
    F: FormatLiteral + ?Sized,
{
    fn compile(&self, expr: &Expr) -> Result<String, CompilationError> {
        match expr {
            Expr::Comparison {
                column,
                operator,
                value,
            } => {
                let value = self.operand(expr, value)?;
                Ok(format!("{} {operator} {value}", self.column(column)))
            }
            Expr::ColumnComparison {
                left,
                operator,
                right,
            } => Ok(format!(
                "{} {operator} {}",
                self.column(left),
                self.column(right)
            )),
            Expr::Between {
                column,
                low,
                high,
                negated,
            } => {
                let col = self.column(column);
                let low = self.operand(expr, low)?;
                let high = self.operand(expr, high)?;
                if *negated {
                    Ok(format!("({col} < {low}) OR ({col} > {high})"))
                } else {
                    Ok(format!("({col} >= {low}) AND ({col} <= {high})"))
                }
            }
            Expr::SetMembership {
                column,
                values,
                negated,
            } => {
                if values.is_empty() {
                    return Ok(String::from(if *negated { EMPTY_NOT_IN } else { EMPTY_IN }));
                }
                let array = array_literal(self.format, values)
                    .map_err(|e| unsupported(expr, e.reason))?;
                let quantifier = if *negated { "<> ALL" } else { "= ANY" };
                Ok(format!("{} {quantifier} ({array})", self.column(column)))
            }
            Expr::NullCheck { column, is_null } => {
                let keyword = if *is_null { "IS NULL" } else { "IS NOT NULL" };
                Ok(format!("{} {keyword}", self.column(column)))
            }
            Expr::RawFragment { template, bindings } => self.raw(expr, template, bindings),
            Expr::Conjunction { left, right } => {
                Ok(format!("({}) AND ({})", self.compile(left)?, self.compile(right)?))
            }
            Expr::Disjunction { left, right } => {
                Ok(format!("({}) OR ({})", self.compile(left)?, self.compile(right)?))
            }
        }
    }

    fn column(&self, name: &str) -> String {
        self.quote.quote_identifier(name)
    }

    /// Formats a comparison operand. NULL is rejected because the
    /// comparison would always evaluate to NULL.
    fn operand(&self, node: &Expr, value: &Literal) -> Result<String, CompilationError> {
        if value.is_null() {
            return Err(CompilationError::NullOperand {
                node: node.describe(),
            });
        }
        self.literal(node, value)
    }

    fn literal(&self, node: &Expr, value: &Literal) -> Result<String, CompilationError> {
        self.format
            .format_literal(value)
            .map_err(|e| unsupported(node, e.reason))
    }

    fn raw(
        &self,
        node: &Expr,
        template: &str,
        bindings: &[Literal],
    ) -> Result<String, CompilationError> {
        let placeholders = template.matches('?').count();
        if placeholders != bindings.len() {
            return Err(CompilationError::PlaceholderMismatch {
                template: template.to_string(),
                placeholders,
                bindings: bindings.len(),
            });
        }

        let mut sql = String::with_capacity(template.len());
        let mut values = bindings.iter();
        for part in template.split_inclusive('?') {
            match part.strip_suffix('?') {
                Some(head) => {
                    sql.push_str(head);
                    // Counts matched above, so a binding is always left here.
                    if let Some(value) = values.next() {
                        sql.push_str(&self.literal(node, value)?);
                    }
                }
                None => sql.push_str(part),
            }
        }
        Ok(sql)
    }
}

fn unsupported(node: &Expr, reason: String) -> CompilationError {
    CompilationError::UnsupportedLiteral {
        node: node.describe(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PostgresDialect;
    use crate::expr::{ComparisonOperator, column};

    fn compile(expr: &Expr) -> String {
        let d = PostgresDialect::new();
        compile_predicate(expr, &d, &d).unwrap()
    }

    #[test]
    fn test_comparison() {
        assert_eq!(compile(&column("phone").eq(1234)), "phone = 1234");
        assert_eq!(compile(&column("code").eq("test")), "code = 'test'");
        assert_eq!(compile(&column("enabled").not_eq(true)), "enabled <> true");
        assert_eq!(compile(&column("Order").gt_eq(1.5)), "\"Order\" >= 1.5");
    }

    #[test]
    fn test_column_comparison() {
        let expr = column("phone").compare_column(ComparisonOperator::NotEq, "icq");
        assert_eq!(compile(&expr), "phone <> icq");
    }

    #[test]
    fn test_between() {
        assert_eq!(
            compile(&column("phone").between(1, 2)),
            "(phone >= 1) AND (phone <= 2)"
        );
        assert_eq!(
            compile(&column("phone").not_between(1, 2)),
            "(phone < 1) OR (phone > 2)"
        );
    }

    #[test]
    fn test_set_membership() {
        assert_eq!(
            compile(&column("phone").in_list([1, 2, 4])),
            "phone = ANY (ARRAY[1, 2, 4])"
        );
        assert_eq!(
            compile(&column("phone").not_in_list([1, 2, 4])),
            "phone <> ALL (ARRAY[1, 2, 4])"
        );
        assert_eq!(
            compile(&column("code").in_list(["a", "b"])),
            "code = ANY (ARRAY['a', 'b'])"
        );
    }

    #[test]
    fn test_empty_set_membership() {
        assert_eq!(compile(&column("phone").in_list(Vec::<i64>::new())), "0 = 1");
        assert_eq!(
            compile(&column("phone").not_in_list(Vec::<i64>::new())),
            "1 = 1"
        );
    }

    #[test]
    fn test_null_check() {
        assert_eq!(compile(&column("deleted_at").is_null()), "deleted_at IS NULL");
        assert_eq!(
            compile(&column("deleted_at").is_not_null()),
            "deleted_at IS NOT NULL"
        );
    }

    #[test]
    fn test_raw_fragment() {
        assert_eq!(
            compile(&Expr::raw("phone = ? and icq < ?", [1, 2])),
            "phone = 1 and icq < 2"
        );
        assert_eq!(
            compile(&Expr::raw("code = ?", ["it's"])),
            "code = 'it''s'"
        );
        assert_eq!(compile(&Expr::raw_sql("lower(code) <> ''")), "lower(code) <> ''");
    }

    #[test]
    fn test_raw_fragment_placeholder_mismatch() {
        let d = PostgresDialect::new();
        let err = compile_predicate(&Expr::raw("phone = ? and icq < ?", [1]), &d, &d).unwrap_err();
        assert_eq!(
            err,
            CompilationError::PlaceholderMismatch {
                template: "phone = ? and icq < ?".to_string(),
                placeholders: 2,
                bindings: 1,
            }
        );
    }

    #[test]
    fn test_composition_parenthesizes_operands() {
        let expr = column("a")
            .eq(1)
            .and(column("b").between(1, 2))
            .or(column("c").is_null());
        assert_eq!(
            compile(&expr),
            "((a = 1) AND ((b >= 1) AND (b <= 2))) OR (c IS NULL)"
        );
    }

    #[test]
    fn test_null_operand_is_rejected() {
        let d = PostgresDialect::new();
        let err = compile_predicate(&column("phone").eq(None::<i64>), &d, &d).unwrap_err();
        assert_eq!(
            err,
            CompilationError::NullOperand {
                node: "comparison on 'phone'".to_string()
            }
        );
    }

    #[test]
    fn test_unsupported_literal_names_node() {
        let d = PostgresDialect::new();
        let err = compile_predicate(&column("ratio").in_list([1.0, f64::NAN]), &d, &d).unwrap_err();
        match err {
            CompilationError::UnsupportedLiteral { node, .. } => {
                assert_eq!(node, "membership test on 'ratio'");
            }
            other => panic!("Expected UnsupportedLiteral, got {other:?}"),
        }
    }

    #[test]
    fn test_injected_capabilities() {
        let quote = |name: &str| format!("`{name}`");
        let format = |value: &Literal| match value {
            Literal::Integer(n) => Ok(format!("{n}")),
            other => Err(crate::dialect::UnsupportedLiteral::new(other.kind())),
        };
        let sql = compile_predicate(&column("phone").in_list([1, 2]), &quote, &format).unwrap();
        assert_eq!(sql, "`phone` = ANY (ARRAY[1, 2])");
    }
}
