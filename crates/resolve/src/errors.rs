//! Error types for the tern resolver
//!
//! Two families live here. `ResolveError` values are user-facing diagnostics
//! reported through a `DiagnosticSink`; resolution always continues after
//! reporting one. `InternalError` signals a broken invariant inside the
//! resolver itself and aborts the pass.

use codespan::{FileId, Span};
use std::fmt;
use tern_diagnostics::{Diag, Severity, coded, help};

/// Result type for resolver operations
pub type ResolveResult<T> = Result<T, InternalError>;

macro_rules! error_codes {
    ($( $(#[$meta:meta])* $name:ident = ($code:literal, $severity:ident, $template:literal), )*) => {
        /// Every rule violation the resolver can report
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ErrorCode {
            $( $(#[$meta])* $name, )*
        }

        impl ErrorCode {
            /// Stable code for categorization
            pub fn code(self) -> &'static str {
                match self {
                    $( Self::$name => $code, )*
                }
            }

            pub fn severity(self) -> Severity {
                match self {
                    $( Self::$name => Severity::$severity, )*
                }
            }

            /// Message with one `{}` per positional argument
            pub fn template(self) -> &'static str {
                match self {
                    $( Self::$name => $template, )*
                }
            }
        }
    };
}

error_codes! {
    // Structural
    DuplicateParameter = ("R0001", Error, "duplicate parameter '{}'"),
    DuplicateLocalVariable = ("R0002", Error, "duplicate local variable '{}'"),
    DuplicateLabelInSwitch = ("R0003", Error, "duplicate label '{}' in switch statement"),
    DuplicateTypeVariable = ("R0004", Error, "duplicate type variable '{}'"),
    DuplicateFunctionExpression = ("R0005", Error, "duplicate function '{}'"),
    CyclicClass = ("R0006", Error, "class '{}' is a supertype of itself"),
    RedirectedConstructorCycle = ("R0007", Error, "constructor '{}' redirects to itself through a cycle"),

    // Visibility
    IllegalAccessToPrivate = ("R0010", Error, "'{}' is private to another library"),
    IllegalAccessToPrivateMember = ("R0011", Error, "'{}' refers to the private member '{}' of another library"),
    CannotAccessMethod = ("R0012", Error, "cannot access private method '{}'"),

    // Context legality
    ThisOnTopLevel = ("R0020", Error, "'this' is not available at top level"),
    ThisOutsideOfMethod = ("R0021", Error, "'this' is only available inside a method"),
    ThisInStaticMethod = ("R0022", Error, "'this' is not available in a static method"),
    ThisInFactoryConstructor = ("R0023", Error, "'this' is not available in a factory constructor"),
    ThisInInitializerAsExpression = ("R0024", Error, "'this' cannot be used as an expression in an initializer list"),
    SuperOnTopLevel = ("R0025", Error, "'super' is not available at top level"),
    SuperOutsideOfMethod = ("R0026", Error, "'super' is only available inside a method"),
    SuperInStaticMethod = ("R0027", Error, "'super' is not available in a static method"),
    SuperInFactoryConstructor = ("R0028", Error, "'super' is not available in a factory constructor"),
    SuperWithoutSuperclass = ("R0029", Error, "'super' used in '{}', which has no superclass"),
    IllegalFieldAccessFromStatic = ("R0030", Error, "instance field '{}' cannot be accessed from a static context"),
    IllegalMethodAccessFromStatic = ("R0031", Error, "instance method '{}' cannot be accessed from a static context"),
    CannotUseInstanceFieldInInstanceFieldInitializer = ("R0032", Error, "instance field '{}' cannot be used in an instance field initializer"),
    CannotAccessFieldInInit = ("R0033", Error, "instance field '{}' cannot be read inside an initializer list"),
    InstanceMethodFromStatic = ("R0034", Error, "instance method '{}' cannot be called from a static context"),
    InstanceMethodFromRedirect = ("R0035", Error, "instance method '{}' cannot be called from a redirecting constructor"),
    InstanceMethodFromInitializer = ("R0036", Error, "instance method '{}' cannot be called from an initializer list"),
    SuperMethodInvocationInInitializer = ("R0037", Error, "super method '{}' cannot be invoked as an initializer"),
    InvalidReturnInConstructor = ("R0038", Error, "generative constructors cannot return a value"),

    // Resolution failures
    CannotBeResolved = ("R0040", Error, "cannot resolve '{}'"),
    CannotBeResolvedLibrary = ("R0041", Error, "cannot resolve '{}' in library '{}'"),
    CannotResolveMethod = ("R0042", Error, "cannot resolve method '{}'"),
    CannotResolveMethodInClass = ("R0043", Error, "cannot resolve method '{}' in class '{}'"),
    CannotResolveMethodInLibrary = ("R0044", Error, "cannot resolve method '{}' in library '{}'"),
    CannotResolveConstructor = ("R0045", Error, "cannot resolve constructor '{}'"),
    CannotResolveSuperConstructor = ("R0046", Error, "cannot resolve super constructor '{}'"),
    CannotResolveImplicitCallToSuperConstructor = ("R0047", Error, "cannot resolve implicit call to the default constructor of super class '{}'"),
    CannotResolveLabel = ("R0048", Error, "cannot resolve label '{}'"),
    CannotAccessOuterLabel = ("R0049", Error, "label '{}' belongs to an enclosing function"),
    NotALabel = ("R0050", Error, "'{}' is not a label"),
    BreakLabelResolvesToCaseOrDefault = ("R0051", Error, "break label '{}' resolves to case or default"),
    ContinueLabelResolvesToSwitch = ("R0052", Error, "continue label '{}' resolves to a switch statement"),
    NoSuchType = ("R0053", Error, "no such type '{}'"),
    UnknownType = ("R0054", Warning, "no such type '{}'"),
    WrongNumberOfTypeArguments = ("R0055", Error, "'{}' expects {} type argument(s) but {} were given"),
    TypeVariableInStaticContext = ("R0056", Error, "type variable '{}' cannot be used in a static context"),
    IsAClass = ("R0057", Error, "'{}' is a class and cannot be used as a value"),
    CannotUseType = ("R0058", Error, "function type alias '{}' cannot be used as a value"),
    CannotUseTypeVariable = ("R0059", Error, "type variable '{}' cannot be used as a value"),
    TypeVariableNotAllowedInIdentifier = ("R0060", Error, "type variable '{}' cannot qualify a member access"),
    UsingLocalVariableBeforeDeclaration = ("R0061", Error, "local variable '{}' is used before its declaration"),
    NotAStaticField = ("R0062", Error, "'{}' is not a static field"),
    NotAStaticMethod = ("R0063", Error, "'{}' is not a static method"),
    FieldDoesNotHaveAGetter = ("R0064", Error, "field '{}' has no getter"),
    FieldDoesNotHaveASetter = ("R0065", Error, "field '{}' has no setter"),
    ExpectedStaticField = ("R0066", Error, "expected a static field but found {}"),
    NotAnInstanceField = ("R0067", Error, "'{}' is static and cannot be accessed through 'super'"),
    ExpectedAnInstanceFieldInSuperClass = ("R0068", Error, "expected an instance member of the super class but found {}"),
    IsAConstructor = ("R0069", Error, "'{}.{}' is a constructor"),
    IsAnInstanceMethod = ("R0070", Error, "'{}.{}' is an instance method"),
    IsAnInstanceField = ("R0071", Error, "'{}.{}' is an instance field"),
    DidYouMeanNew = ("R0072", Error, "'{}' is a {}; did you mean to use 'new'?"),
    CannotCallFunctionTypeAlias = ("R0073", Error, "function type alias '{}' cannot be called"),
    CannotCallLibraryPrefix = ("R0074", Error, "library prefix '{}' cannot be called"),
    UseAssignmentOnSetter = ("R0075", Error, "field '{}' only has a setter; use an assignment"),
    NewExpressionNotConstructor = ("R0076", Error, "'{}' does not name a constructor"),
    NewExpressionCantUseTypeVariable = ("R0077", Error, "cannot instantiate type variable '{}'"),
    CannotAssignToFinal = ("R0078", Error, "cannot assign to final '{}'"),
    CannotAssignToMethod = ("R0079", Error, "cannot assign to method '{}'"),

    // Initialization
    FinalFieldMustBeInitialized = ("R0080", Error, "final field '{}' must be initialized"),
    ConstRequiresValue = ("R0081", Error, "const '{}' must have a value"),
    StaticFinalRequiresValue = ("R0082", Error, "static final field '{}' must have a value"),
    TopLevelFinalRequiresValue = ("R0083", Error, "top-level final '{}' must have a value"),
    ConstantsMustBeInitialized = ("R0084", Error, "final local '{}' must be initialized"),
    DuplicateInitialization = ("R0085", Error, "field '{}' is initialized more than once"),
    CannotResolveField = ("R0086", Error, "cannot resolve field '{}' to initialize"),
    CannotInitStaticFieldInInitializer = ("R0087", Error, "static field '{}' cannot be initialized in an initializer list"),
    InitFieldOnlyImmediatelySurroundingClass = ("R0088", Error, "'{}' is not a field of the immediately enclosing class"),
    ExpectedFieldNotMethod = ("R0089", Error, "'{}' is a method; expected a field"),
    ExpectedFieldNotClass = ("R0090", Error, "'{}' is a class; expected a field"),
    ExpectedFieldNotParameter = ("R0091", Error, "'{}' is a parameter; expected a field"),
    ExpectedFieldNotTypeVariable = ("R0092", Error, "'{}' is a type variable; expected a field"),
    ParameterInitOutsideConstructor = ("R0093", Error, "field parameter 'this.{}' is only allowed in a constructor"),
    NamedParameterCannotBePrivate = ("R0094", Error, "named parameter '{}' cannot be private"),
    MethodMustHaveBody = ("R0095", Error, "method '{}' must have a body"),

    // Constructor contracts
    TooFewArgumentsInImplicitSuper = ("R0100", Error, "implicit call to the default constructor of '{}' is missing required arguments"),
    ConstConstructorMustCallConstSuper = ("R0101", Error, "const constructor '{}' must call a const constructor"),
    ConstAndNonConstConstructor = ("R0102", Error, "'const' used with non-const constructor '{}'"),
    ConstWithTypeVariable = ("R0103", Error, "const constructor invocation cannot use type variable '{}'"),
    ConstClassWithNonFinalFields = ("R0104", Error, "class '{}' has a const constructor but field '{}' is not final"),
    ConstClassWithInheritedNonFinalFields = ("R0105", Error, "class '{}' has a const constructor but inherits the non-final field '{}' from '{}'"),
    DefaultConstructorUnresolved = ("R0106", Error, "cannot resolve constructor '{}' in default class '{}'"),
    DefaultConstructorNumberOfRequiredParameters = ("R0107", Error, "constructor '{}' of interface '{}' has {} required parameter(s) but '{}' of default class '{}' has {}"),
    DefaultConstructorNamedParameters = ("R0108", Error, "constructor '{}' of interface '{}' has named parameters [{}] but '{}' of default class '{}' has [{}]"),
    DefaultMustSpecifyClass = ("R0109", Error, "default class '{}' must be a class, not an interface"),
    DefaultClassMustHaveSameTypeParameters = ("R0110", Error, "interface '{}' and its default class '{}' declare different numbers of type parameters"),
    TypeVariableDoesNotMatch = ("R0111", Error, "type variable '{}' does not match '{}' of default class '{}'"),
    TypeParametersMustMatchExactly = ("R0112", Error, "type parameters of the default clause must match those of '{}' exactly"),
    IllegalConstructorNoDefaultInInterface = ("R0113", Error, "interface '{}' declares constructor '{}' but has no default class"),

    // Literals
    ConstArrayWithTypeVariable = ("R0120", Error, "const array literal cannot use type variable '{}'"),
    ConstMapWithTypeVariable = ("R0121", Error, "const map literal cannot use type variable '{}'"),
    LegacyMapLiteral = ("R0122", Warning, "map literal with one type argument is deprecated; write <String, {}>"),
}

impl ErrorCode {
    /// Fix-it hint for codes that have an obvious one
    pub fn note(self) -> Option<&'static str> {
        match self {
            Self::DidYouMeanNew | Self::IsAConstructor => {
                Some("object creation is written `new Name(...)`")
            }
            Self::CannotAccessOuterLabel => {
                Some("labels cannot be targeted across function boundaries")
            }
            Self::RedirectedConstructorCycle => {
                Some("one constructor in the chain must initialize the object")
            }
            Self::UsingLocalVariableBeforeDeclaration => {
                Some("a local variable is in scope for its entire block")
            }
            _ => None,
        }
    }
}

/// A reported rule violation
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveError {
    pub code: ErrorCode,
    pub args: Vec<String>,
    pub span: Option<Span>,
    pub file_id: Option<FileId>,
}

impl ResolveError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            args: Vec::new(),
            span: None,
            file_id: None,
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_file(mut self, file_id: FileId) -> Self {
        self.file_id = Some(file_id);
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity(), Severity::Error | Severity::Bug)
    }

    /// Template with the arguments substituted in order. Missing arguments
    /// render as `?`, extra ones are ignored.
    pub fn message(&self) -> String {
        let template = self.code.template();
        let mut out = String::with_capacity(template.len() + 16);
        let mut args = self.args.iter();
        let mut rest = template;
        while let Some(pos) = rest.find("{}") {
            out.push_str(&rest[..pos]);
            match args.next() {
                Some(arg) => out.push_str(arg),
                None => out.push('?'),
            }
            rest = &rest[pos + 2..];
        }
        out.push_str(rest);
        out
    }

    /// Convert to a diagnostic for reporting
    pub fn to_diagnostic(&self) -> Diag {
        let location = self.file_id.zip(self.span);
        let label = self.args.first().map_or_else(String::new, |arg| format!("'{}'", arg));
        let mut diagnostic = coded(self.severity(), self.code.code(), self.message(), location, label);
        if let Some(note) = self.code.note() {
            diagnostic = diagnostic.with_notes(vec![help(note)]);
        }
        diagnostic
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message())
    }
}

impl std::error::Error for ResolveError {}

/// Receiver of reported diagnostics
pub trait DiagnosticSink {
    fn report(&mut self, error: ResolveError);
}

impl DiagnosticSink for Vec<ResolveError> {
    fn report(&mut self, error: ResolveError) {
        self.push(error);
    }
}

/// A violated resolver invariant. Never caused by the input program alone.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalError {
    pub message: String,
    pub span: Option<Span>,
}

impl InternalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "internal resolver error at {}: {}", span, self.message),
            None => write!(f, "internal resolver error: {}", self.message),
        }
    }
}

impl std::error::Error for InternalError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = ResolveError::new(ErrorCode::CannotBeResolved).with_arg("foo");
        assert_eq!(error.code.code(), "R0040");
        assert_eq!(error.message(), "cannot resolve 'foo'");
        assert!(error.is_error());
    }

    #[test]
    fn test_message_with_missing_and_extra_args() {
        let missing = ResolveError::new(ErrorCode::CannotResolveMethodInClass).with_arg("m");
        assert_eq!(missing.message(), "cannot resolve method 'm' in class '?'");

        let extra = ResolveError::new(ErrorCode::NotALabel).with_args(["a", "b"]);
        assert_eq!(extra.message(), "'a' is not a label");
    }

    #[test]
    fn test_error_with_span() {
        let span = Span::new(codespan::ByteIndex(0), codespan::ByteIndex(10));
        let error = ResolveError::new(ErrorCode::CannotResolveLabel)
            .with_arg("L")
            .with_span(span);
        assert_eq!(error.span, Some(span));
    }

    #[test]
    fn test_diagnostic_conversion() {
        let warning = ResolveError::new(ErrorCode::UnknownType).with_arg("Foo");
        let diagnostic = warning.to_diagnostic();
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.code.as_deref(), Some("R0054"));
        assert!(diagnostic.labels.is_empty());

        let hinted = ResolveError::new(ErrorCode::DidYouMeanNew).with_args(["A", "class"]);
        assert_eq!(hinted.to_diagnostic().notes.len(), 1);
    }

    #[test]
    fn test_codes_are_unique() {
        let codes = [
            ErrorCode::DuplicateParameter,
            ErrorCode::CyclicClass,
            ErrorCode::IllegalAccessToPrivate,
            ErrorCode::ThisOnTopLevel,
            ErrorCode::CannotBeResolved,
            ErrorCode::FinalFieldMustBeInitialized,
            ErrorCode::TooFewArgumentsInImplicitSuper,
            ErrorCode::ConstArrayWithTypeVariable,
        ];
        let mut seen: Vec<&str> = codes.iter().map(|code| code.code()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), codes.len());
    }

    #[test]
    fn test_internal_error_display() {
        let error = InternalError::new("unexpected enclosing element");
        assert_eq!(
            error.to_string(),
            "internal resolver error: unexpected enclosing element"
        );
    }
}
