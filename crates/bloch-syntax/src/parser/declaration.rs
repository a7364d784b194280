//! Function, class and annotation parsing for Bloch.

use super::Parser;
use crate::ast::{
    Annotation, ClassDeclaration, ClassMember, ConstructorDeclaration, DestructorDeclaration,
    FieldDeclaration, FunctionDeclaration, MethodDeclaration, Parameter, Position, Type,
    Visibility,
};
use crate::error::ParseResult;
use crate::token::TokenKind;

/// Where an annotation appears, which decides the names it may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum AnnotationSite {
    /// `@tracked`
    Variable,
    /// `@quantum`, `@shots(N)`
    Function,
    /// Any of the above, on a class member.
    Member,
}

impl AnnotationSite {
    fn allows(self, kind: TokenKind) -> bool {
        match self {
            AnnotationSite::Variable => kind == TokenKind::Tracked,
            AnnotationSite::Function => matches!(kind, TokenKind::Quantum | TokenKind::Shots),
            AnnotationSite::Member => matches!(
                kind,
                TokenKind::Tracked | TokenKind::Quantum | TokenKind::Shots
            ),
        }
    }

    fn noun(self) -> &'static str {
        match self {
            AnnotationSite::Variable => "variable",
            AnnotationSite::Function => "function",
            AnnotationSite::Member => "class member",
        }
    }
}

/// Member modifiers seen before the member keyword or type.
#[derive(Debug, Default)]
struct Modifiers {
    is_static: bool,
    is_virtual: bool,
    is_override: bool,
}

impl Parser {
    /// `@quantum` or `@shots` ahead, which starts a function declaration.
    pub(super) fn check_function_annotation(&self) -> bool {
        self.check(TokenKind::At)
            && matches!(self.peek_next_kind(), TokenKind::Quantum | TokenKind::Shots)
    }

    /// Parse one `@name` or `@shots(N)` annotation.
    pub(super) fn parse_annotation(&mut self, site: AnnotationSite) -> ParseResult<Annotation> {
        let at = self.expect(TokenKind::At, "Expected '@' to begin annotation")?;

        if !site.allows(self.peek().kind) {
            return Err(self.error(format!(
                "\"@{}\" is not a valid Bloch {} annotation",
                self.peek().text,
                site.noun()
            )));
        }
        let name = self.advance();

        let value = if name.kind == TokenKind::Shots {
            self.expect(TokenKind::LParen, "Expected opening bracket '('")?;
            let count = self.expect(
                TokenKind::IntegerLiteral,
                "Number of shots must be an integer",
            )?;
            self.expect(TokenKind::RParen, "Expected closing bracket ')'")?;
            Some(count.text)
        } else {
            None
        };

        Ok(Annotation {
            name: name.text,
            value,
            pos: Position::new(at.line, at.column),
        })
    }

    /// Parse consecutive annotations for one declaration.
    pub(super) fn parse_annotations(
        &mut self,
        site: AnnotationSite,
    ) -> ParseResult<Vec<Annotation>> {
        let mut annotations = Vec::new();
        while self.check(TokenKind::At) {
            annotations.push(self.parse_annotation(site)?);
        }
        Ok(annotations)
    }

    /// Parse a free function declaration.
    pub(super) fn parse_function(&mut self) -> ParseResult<FunctionDeclaration> {
        let annotations = self.parse_annotations(AnnotationSite::Function)?;
        let has_quantum_annotation = annotations.iter().any(|a| a.name == "quantum");
        let has_shots_annotation = annotations.iter().any(|a| a.name == "shots");

        self.expect(TokenKind::Function, "Expected 'function' keyword")?;
        let name = self.expect(
            TokenKind::Identifier,
            "Expected function name after 'function' keyword",
        )?;

        self.expect(TokenKind::LParen, "Expected '(' after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect(TokenKind::RParen, "Expected ')' after parameters")?;

        self.expect(TokenKind::Arrow, "Expected '->' before return type")?;
        let return_type = self.parse_type()?;
        let body = self.parse_block()?;

        Ok(FunctionDeclaration {
            name: name.text,
            params,
            return_type,
            body,
            annotations,
            has_quantum_annotation,
            has_shots_annotation,
            pos: Position::new(name.line, name.column),
        })
    }

    /// Parse `type name, type name, ...` up to (not including) `)`.
    fn parse_parameter_list(&mut self) -> ParseResult<Vec<Parameter>> {
        if self.check(TokenKind::RParen) {
            return Ok(vec![]);
        }
        let mut params = vec![self.parse_parameter()?];
        while self.consume(TokenKind::Comma) {
            params.push(self.parse_parameter()?);
        }
        Ok(params)
    }

    fn parse_parameter(&mut self) -> ParseResult<Parameter> {
        let ty = self.parse_type()?;
        let name = self.expect(TokenKind::Identifier, "Expected parameter name")?;
        Ok(Parameter {
            name: name.text,
            ty,
            pos: Position::new(name.line, name.column),
        })
    }

    /// Parse a class declaration.
    pub(super) fn parse_class(&mut self) -> ParseResult<ClassDeclaration> {
        let mut is_static = false;
        let mut is_abstract = false;
        loop {
            if self.consume(TokenKind::Static) {
                if is_static {
                    return Err(self.error("duplicate 'static' modifier on class"));
                }
                is_static = true;
            } else if self.consume(TokenKind::Abstract) {
                if is_abstract {
                    return Err(self.error("duplicate 'abstract' modifier on class"));
                }
                is_abstract = true;
            } else {
                break;
            }
        }

        self.expect(TokenKind::Class, "Expected 'class' keyword")?;
        let name = self.expect(TokenKind::Identifier, "Expected class name after 'class'")?;

        let base = if self.consume(TokenKind::Extends) {
            let Type::Named { parts } = self.parse_type()? else {
                return Err(self.error("Base class must be a named type"));
            };
            if self.check(TokenKind::Extends) {
                return Err(self.error("Only single inheritance is supported"));
            }
            Some(parts)
        } else {
            None
        };

        self.expect(TokenKind::LBrace, "Expected '{' to start class body")?;
        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            members.push(self.parse_class_member(&name.text, is_static)?);
        }
        self.expect(TokenKind::RBrace, "Expected '}' to end class body")?;

        Ok(ClassDeclaration {
            name: name.text,
            is_static,
            is_abstract,
            base,
            members,
            pos: Position::new(name.line, name.column),
        })
    }

    fn parse_visibility(&mut self) -> Option<Visibility> {
        let visibility = match self.peek().kind {
            TokenKind::Public => Visibility::Public,
            TokenKind::Private => Visibility::Private,
            TokenKind::Protected => Visibility::Protected,
            _ => return None,
        };
        self.advance();
        Some(visibility)
    }

    fn parse_modifiers(&mut self) -> ParseResult<Modifiers> {
        let mut modifiers = Modifiers::default();
        loop {
            let (flag, word) = match self.peek().kind {
                TokenKind::Static => (&mut modifiers.is_static, "static"),
                TokenKind::Virtual => (&mut modifiers.is_virtual, "virtual"),
                TokenKind::Override => (&mut modifiers.is_override, "override"),
                _ => return Ok(modifiers),
            };
            if *flag {
                return Err(self.error(format!("Duplicate '{word}' modifier")));
            }
            *flag = true;
            self.advance();
        }
    }

    /// Parse one member of a class body.
    fn parse_class_member(
        &mut self,
        class_name: &str,
        in_static_class: bool,
    ) -> ParseResult<ClassMember> {
        let mut annotations = self.parse_annotations(AnnotationSite::Member)?;

        let visibility = match self.parse_visibility() {
            Some(v) => {
                if self.parse_visibility().is_some() {
                    return Err(self.error(
                        "Multiple visibility modifiers are not allowed on class members",
                    ));
                }
                v
            }
            None if in_static_class => Visibility::Public,
            None => Visibility::Private,
        };

        let modifiers = self.parse_modifiers()?;
        annotations.extend(self.parse_annotations(AnnotationSite::Member)?);
        let any_modifier = modifiers.is_static || modifiers.is_virtual || modifiers.is_override;

        if self.check(TokenKind::Constructor) {
            if !annotations.is_empty() {
                return Err(self.error("Annotations are not allowed on constructors"));
            }
            if in_static_class {
                return Err(self.error("Static classes cannot declare constructors"));
            }
            if any_modifier {
                return Err(self.error("Constructors cannot be static, virtual, or override"));
            }
            return self
                .parse_constructor(visibility, class_name)
                .map(ClassMember::Constructor);
        }

        if self.check(TokenKind::Destructor) {
            if !annotations.is_empty() {
                return Err(self.error("Annotations are not allowed on destructors"));
            }
            if in_static_class {
                return Err(self.error("Static classes cannot declare destructors"));
            }
            if any_modifier {
                return Err(self.error("Destructors cannot be static, virtual, or override"));
            }
            return self.parse_destructor(visibility).map(ClassMember::Destructor);
        }

        if self.consume(TokenKind::Function) {
            if in_static_class && !modifiers.is_static {
                return Err(self.error("Static classes may only contain static methods"));
            }
            if in_static_class && (modifiers.is_virtual || modifiers.is_override) {
                return Err(
                    self.error("Static classes cannot contain virtual or override methods")
                );
            }
            return self
                .parse_method(visibility, &modifiers, annotations)
                .map(ClassMember::Method);
        }

        if modifiers.is_virtual || modifiers.is_override {
            return Err(self.error("'virtual' or 'override' may only modify methods"));
        }
        if in_static_class && !modifiers.is_static {
            return Err(self.error("Static classes may only contain static members"));
        }

        let is_final = self.consume(TokenKind::Final);
        self.parse_field(visibility, is_final, modifiers.is_static, annotations)
            .map(ClassMember::Field)
    }

    fn parse_field(
        &mut self,
        visibility: Visibility,
        is_final: bool,
        is_static: bool,
        annotations: Vec<Annotation>,
    ) -> ParseResult<FieldDeclaration> {
        let is_tracked = annotations.iter().any(|a| a.name == "tracked");
        let ty = self.parse_type()?;
        let name = self.expect(TokenKind::Identifier, "Expected field name")?;
        let initializer = if self.consume(TokenKind::Equals) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "Expected ';' after field declaration")?;

        Ok(FieldDeclaration {
            name: name.text,
            ty,
            initializer,
            annotations,
            visibility,
            is_final,
            is_static,
            is_tracked,
            pos: Position::new(name.line, name.column),
        })
    }

    fn parse_method(
        &mut self,
        visibility: Visibility,
        modifiers: &Modifiers,
        annotations: Vec<Annotation>,
    ) -> ParseResult<MethodDeclaration> {
        let has_quantum_annotation = annotations.iter().any(|a| a.name == "quantum");
        let has_shots_annotation = annotations.iter().any(|a| a.name == "shots");
        let name = self.expect(TokenKind::Identifier, "Expected method name")?;

        self.expect(TokenKind::LParen, "Expected '(' after method name")?;
        let params = self.parse_parameter_list()?;
        self.expect(TokenKind::RParen, "Expected ')' after parameters")?;
        self.expect(TokenKind::Arrow, "Expected '->' before return type")?;
        let return_type = self.parse_type()?;

        let body = if self.check(TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else if modifiers.is_virtual {
            self.expect(
                TokenKind::Semicolon,
                "Expected ';' after virtual method declaration without a body",
            )?;
            None
        } else {
            return Err(self.error("Method must have a body unless it is marked 'virtual'"));
        };

        Ok(MethodDeclaration {
            name: name.text,
            params,
            return_type,
            body,
            annotations,
            visibility,
            is_static: modifiers.is_static,
            is_virtual: modifiers.is_virtual,
            is_override: modifiers.is_override,
            has_quantum_annotation,
            has_shots_annotation,
            pos: Position::new(name.line, name.column),
        })
    }

    /// Parse `= default;` or a block, returning `None` for the default form.
    fn parse_special_body(&mut self, what: &str) -> ParseResult<Option<crate::ast::Block>> {
        if self.consume(TokenKind::Equals) {
            self.expect(TokenKind::Default, "Expected 'default' after '='")?;
            self.expect(
                TokenKind::Semicolon,
                &format!("Expected ';' after default {what}"),
            )?;
            Ok(None)
        } else {
            self.parse_block().map(Some)
        }
    }

    fn parse_constructor(
        &mut self,
        visibility: Visibility,
        class_name: &str,
    ) -> ParseResult<ConstructorDeclaration> {
        let keyword = self.advance();
        self.expect(TokenKind::LParen, "Expected '(' after 'constructor'")?;
        let params = self.parse_parameter_list()?;
        self.expect(
            TokenKind::RParen,
            "Expected ')' after constructor parameters",
        )?;
        self.expect(
            TokenKind::Arrow,
            "Expected '->' before constructor return type",
        )?;

        let returns_class = matches!(
            self.parse_type()?,
            Type::Named { ref parts } if parts.last().is_some_and(|p| p == class_name)
        );
        if !returns_class {
            return Err(self.error(format!("Constructor must return '{class_name}'")));
        }

        let body = self.parse_special_body("constructor")?;
        Ok(ConstructorDeclaration {
            params,
            is_default: body.is_none(),
            body,
            visibility,
            pos: Position::new(keyword.line, keyword.column),
        })
    }

    fn parse_destructor(&mut self, visibility: Visibility) -> ParseResult<DestructorDeclaration> {
        let keyword = self.advance();
        self.expect(TokenKind::LParen, "Expected '(' after 'destructor'")?;
        if !self.check(TokenKind::RParen) {
            return Err(self.error("Destructor cannot have parameters"));
        }
        self.advance();
        self.expect(
            TokenKind::Arrow,
            "Expected '->' before destructor return type",
        )?;
        if self.parse_type()? != Type::Void {
            return Err(self.error("Destructor must return 'void'"));
        }

        let body = self.parse_special_body("destructor")?;
        Ok(DestructorDeclaration {
            is_default: body.is_none(),
            body,
            visibility,
            pos: Position::new(keyword.line, keyword.column),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{ClassMember, Program, Type, Visibility};
    use crate::error::ParseResult;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn parse_str(source: &str) -> ParseResult<Program> {
        parse(tokenize(source)?)
    }

    #[test]
    fn test_function_with_params_and_annotations() {
        let program =
            parse_str("@quantum @shots(100) function main(int n, qubit[4] reg) -> bit { }")
                .unwrap();
        let f = &program.functions[0];
        assert_eq!(f.name, "main");
        assert!(f.has_quantum_annotation);
        assert!(f.has_shots_annotation);
        assert_eq!(f.shots_value(), Some("100"));
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.params[0].ty, Type::primitive("int"));
        assert!(matches!(f.params[1].ty, Type::Array { size: Some(4), .. }));
        assert_eq!(f.return_type, Type::primitive("bit"));
    }

    #[test]
    fn test_function_requires_arrow() {
        let err = parse_str("function f() { }").unwrap_err();
        assert_eq!(err.message(), "Expected '->' before return type");
    }

    #[test]
    fn test_parameter_list_rejects_trailing_comma() {
        let err = parse_str("function f(int a,) -> void { }").unwrap_err();
        assert_eq!(err.message(), "Expected type");
        assert_eq!((err.line(), err.column()), (1, 18));

        assert!(parse_str("class C { function m(int a,) -> void { } }").is_err());
        assert!(parse_str("class C { constructor(int a,) -> C = default; }").is_err());
        assert!(parse_str("function f(,) -> void { }").is_err());
        assert!(parse_str("function f() -> void { }").is_ok());
    }

    #[test]
    fn test_method_annotations_are_flagged() {
        let program =
            parse_str("class Sim { @quantum @shots(8) public function run() -> bit { } }")
                .unwrap();
        let ClassMember::Method(run) = &program.classes[0].members[0] else {
            panic!("expected method");
        };
        assert!(run.has_quantum_annotation);
        assert!(run.has_shots_annotation);

        let program = parse_str("class Sim { @quantum function run() -> bit { } }").unwrap();
        let ClassMember::Method(run) = &program.classes[0].members[0] else {
            panic!("expected method");
        };
        assert!(!run.has_shots_annotation);
    }

    #[test]
    fn test_invalid_function_annotation_names_token() {
        let err = parse_str("@quantum @tracked function f() -> void { }").unwrap_err();
        assert_eq!(
            err.message(),
            "\"@tracked\" is not a valid Bloch function annotation"
        );
    }

    #[test]
    fn test_shots_requires_integer() {
        let err = parse_str("@shots(x) function main() -> void { }").unwrap_err();
        assert_eq!(err.message(), "Number of shots must be an integer");
    }

    #[test]
    fn test_class_with_all_member_kinds() {
        let source = r"
            class Counter extends base.Tally {
                @tracked private qubit q;
                public final int limit = 3;
                constructor(int start) -> Counter { }
                destructor() -> void = default;
                public virtual function tick() -> void;
                public override function clear() -> void { }
                static function make() -> Counter { return new Counter(0); }
            }
        ";
        let program = parse_str(source).unwrap();
        let class = &program.classes[0];
        assert_eq!(class.name, "Counter");
        assert_eq!(class.base, Some(vec!["base".into(), "Tally".into()]));
        assert_eq!(class.members.len(), 7);

        let ClassMember::Field(q) = &class.members[0] else {
            panic!("expected field");
        };
        assert!(q.is_tracked);
        assert_eq!(q.visibility, Visibility::Private);

        let ClassMember::Field(limit) = &class.members[1] else {
            panic!("expected field");
        };
        assert!(limit.is_final);
        assert!(limit.initializer.is_some());

        assert!(matches!(
            &class.members[2],
            ClassMember::Constructor(c) if !c.is_default && c.params.len() == 1
        ));
        assert!(matches!(&class.members[3], ClassMember::Destructor(d) if d.is_default));
        assert!(matches!(
            &class.members[4],
            ClassMember::Method(m) if m.is_virtual && m.body.is_none()
        ));
        assert!(matches!(&class.members[5], ClassMember::Method(m) if m.is_override));
        assert!(matches!(
            &class.members[6],
            ClassMember::Method(m) if m.is_static && m.visibility == Visibility::Private
        ));
    }

    #[test]
    fn test_static_class_defaults_to_public() {
        let program =
            parse_str("static class Util { static int n; static function f() -> int { return n; } }")
                .unwrap();
        let class = &program.classes[0];
        assert!(class.is_static);
        let ClassMember::Field(n) = &class.members[0] else {
            panic!("expected field");
        };
        assert_eq!(n.visibility, Visibility::Public);
    }

    #[test]
    fn test_static_class_rejects_instance_method() {
        let err = parse_str("static class Util { function f() -> int { return 1; } }").unwrap_err();
        assert_eq!(err.message(), "Static classes may only contain static methods");
    }

    #[test]
    fn test_abstract_class_modifiers() {
        let program = parse_str("abstract class Shape { }").unwrap();
        assert!(program.classes[0].is_abstract);

        let err = parse_str("abstract abstract class Shape { }").unwrap_err();
        assert_eq!(err.message(), "duplicate 'abstract' modifier on class");
    }

    #[test]
    fn test_constructor_must_return_class() {
        let err = parse_str("class A { constructor() -> B { } }").unwrap_err();
        assert_eq!(err.message(), "Constructor must return 'A'");
    }

    #[test]
    fn test_destructor_rules() {
        let err = parse_str("class A { destructor(int x) -> void { } }").unwrap_err();
        assert_eq!(err.message(), "Destructor cannot have parameters");

        let err = parse_str("class A { destructor() -> int { } }").unwrap_err();
        assert_eq!(err.message(), "Destructor must return 'void'");
    }

    #[test]
    fn test_method_needs_body_unless_virtual() {
        let err = parse_str("class A { function f() -> void; }").unwrap_err();
        assert_eq!(
            err.message(),
            "Method must have a body unless it is marked 'virtual'"
        );
    }

    #[test]
    fn test_member_modifier_errors() {
        let err = parse_str("class A { public private int x; }").unwrap_err();
        assert_eq!(
            err.message(),
            "Multiple visibility modifiers are not allowed on class members"
        );

        let err = parse_str("class A { static static int x; }").unwrap_err();
        assert_eq!(err.message(), "Duplicate 'static' modifier");

        let err = parse_str("class A { virtual int x; }").unwrap_err();
        assert_eq!(err.message(), "'virtual' or 'override' may only modify methods");
    }

    #[test]
    fn test_base_class_must_be_named() {
        let err = parse_str("class A extends int { }").unwrap_err();
        assert_eq!(err.message(), "Base class must be a named type");
    }

    #[test]
    fn test_unclosed_class_body() {
        let err = parse_str("class A { int x;").unwrap_err();
        assert_eq!(err.message(), "Expected '}' to end class body");
    }
}
