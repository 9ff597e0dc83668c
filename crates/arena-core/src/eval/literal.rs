use super::{ExpressionEvaluator, TypeResolutionContext};
use crate::errors::EvalError;
use crate::model::{TypeDescriptor, Value};

/// Evaluador de literales: strings entre comillas simples o dobles, chars
/// (`c'x'`), enteros (`10`, `10L`), flotantes (`1.5`, `1.5f`, `2d`),
/// booleanos, `null` y arrays (`[1, 'a']`).
#[derive(Debug, Clone, Default)]
pub struct LiteralEvaluator {
    context: TypeResolutionContext,
}

impl LiteralEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: TypeResolutionContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &TypeResolutionContext {
        &self.context
    }
}

fn invalid(expression: &str, reason: &str) -> EvalError {
    EvalError::Invalid { expression: expression.to_string(),
                         reason: reason.to_string() }
}

fn unquote(body: &str, expression: &str) -> Result<String, EvalError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other @ ('\\' | '\'' | '"')) => out.push(other),
            Some(other) => return Err(invalid(expression, &format!("unknown escape \\{other}"))),
            None => return Err(invalid(expression, "dangling escape")),
        }
    }
    Ok(out)
}

/// Divide por comas de primer nivel (fuera de comillas y corchetes).
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

fn parse_number(e: &str) -> Option<Value> {
    let last = e.chars().last()?;
    let head = &e[..e.len() - last.len_utf8()];
    match last {
        'L' | 'l' => head.parse::<i64>().ok().map(Value::long),
        'f' | 'F' => head.parse::<f32>().ok().map(Value::float),
        'd' | 'D' => head.parse::<f64>().ok().map(Value::double),
        _ if e.contains(['.', 'e', 'E']) => e.parse::<f64>().ok().map(Value::double),
        _ => {
            let i = e.parse::<i64>().ok()?;
            Some(if i32::try_from(i).is_ok() { Value::int(i) } else { Value::long(i) })
        }
    }
}

impl ExpressionEvaluator for LiteralEvaluator {
    fn eval(&self, expression: &str) -> Result<Value, EvalError> {
        let e = expression.trim();
        match e {
            "" => return Err(invalid(expression, "empty expression")),
            "null" => return Ok(Value::null()),
            "true" => return Ok(Value::bool(true)),
            "false" => return Ok(Value::bool(false)),
            _ => {}
        }
        if let Some(body) = e.strip_prefix("c'").and_then(|r| r.strip_suffix('\'')) {
            let text = unquote(body, expression)?;
            let mut chars = text.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::char(c)),
                _ => Err(invalid(expression, "char literal must hold exactly one character")),
            };
        }
        for q in ['\'', '"'] {
            if e.len() >= 2 && e.starts_with(q) && e.ends_with(q) {
                return Ok(Value::string(unquote(&e[1..e.len() - 1], expression)?));
            }
        }
        if let Some(body) = e.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            if body.trim().is_empty() {
                return Ok(Value::array(Vec::new(), TypeDescriptor::object()));
            }
            let items = split_top_level(body).into_iter().map(|part| self.eval(part)).collect::<Result<Vec<_>, _>>()?;
            let first = items[0].type_tag.clone();
            let element = if items.iter().all(|v| v.type_tag == first) { first } else { TypeDescriptor::object() };
            return Ok(Value::array(items, element));
        }
        if e.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.') {
            return parse_number(e).ok_or_else(|| invalid(expression, "malformed number"));
        }
        Err(EvalError::Unsupported(expression.to_string()))
    }

    fn set_type_resolution_context(&mut self, ctx: TypeResolutionContext) {
        self.context = ctx;
    }

    fn resolve_type(&self, name: &str) -> Result<TypeDescriptor, EvalError> {
        let name = name.trim();
        if let Some(target) = self.context.aliases.get(name) {
            return Ok(TypeDescriptor::parse(target));
        }
        match TypeDescriptor::parse(name) {
            TypeDescriptor::Reference(full) if !full.starts_with("java.") && !self.context.known.contains(&full) => {
                Err(EvalError::UnknownType(name.to_string()))
            }
            TypeDescriptor::Void | TypeDescriptor::Null => Err(EvalError::UnknownType(name.to_string())),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Payload, PrimitiveKind};

    #[test]
    fn evaluates_literals() {
        let ev = LiteralEvaluator::new();
        assert_eq!(ev.eval("'Hello World!'").expect("string").as_str(), Some("Hello World!"));
        assert_eq!(ev.eval("\"it\\'s\"").expect("escaped").as_str(), Some("it's"));
        assert_eq!(ev.eval("10").expect("int"), Value::int(10));
        assert_eq!(ev.eval("10L").expect("long"), Value::long(10));
        assert_eq!(ev.eval("3000000000").expect("long").type_tag, TypeDescriptor::Primitive(PrimitiveKind::Long));
        assert_eq!(ev.eval("1.5").expect("double"), Value::double(1.5));
        assert_eq!(ev.eval("c'x'").expect("char"), Value::char('x'));
        assert_eq!(ev.eval("null").expect("null"), Value::null());
    }

    #[test]
    fn evaluates_arrays_with_common_element_type() {
        let ev = LiteralEvaluator::new();
        let arr = ev.eval("[1, 2, 3]").expect("array");
        assert_eq!(arr.type_tag, TypeDescriptor::parse("int[]"));
        let mixed = ev.eval("['a,b', 2]").expect("mixed");
        match mixed.payload {
            Payload::Array(items) => assert_eq!(items[0].as_str(), Some("a,b")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_code() {
        let ev = LiteralEvaluator::new();
        assert!(matches!(ev.eval("Arrays.toString(x)"), Err(EvalError::Unsupported(_))));
        assert!(matches!(ev.eval("12abc"), Err(EvalError::Invalid { .. })));
    }

    #[test]
    fn resolves_types_through_context() {
        let mut ev = LiteralEvaluator::new();
        assert_eq!(ev.resolve_type("String").expect("jdk"), TypeDescriptor::string());
        assert!(ev.resolve_type("Stack").is_err());
        ev.set_type_resolution_context(TypeResolutionContext::default().with_alias("Stack", "ArrayStack"));
        assert_eq!(ev.resolve_type("Stack").expect("alias"), TypeDescriptor::Reference("ArrayStack".into()));
    }
}
