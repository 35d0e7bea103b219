//! PHP dialect
//!
//! Recognises namespaces, `use` imports, classes (and interfaces, traits,
//! enums), methods, free functions, properties and constants, plus four
//! kinds of usage: `Class::member`, `$var->member`, `new Class` and bare
//! `name(...)` calls.

use super::rules::{PatternRules, RuleSource};
use super::LanguageParser;
use std::sync::OnceLock;

/// PHP global functions, common framework helpers and control-flow keywords.
///
/// Keep this list stable: adding or removing an entry changes which calls
/// show up as `function_call` usages and therefore the resulting graph.
pub const PHP_BUILTINS: &[&str] = &[
    // Common PHP built-ins
    "array", "count", "isset", "empty",
    "strlen", "substr", "strpos", "str_replace",
    "preg_match", "preg_replace", "explode", "implode",
    "trim", "ltrim", "rtrim", "strtolower", "strtoupper",
    "ucfirst", "ucwords", "sprintf", "printf",
    "file_get_contents", "file_put_contents", "fopen", "fclose",
    "json_encode", "json_decode", "serialize", "unserialize",
    "md5", "sha1", "hash", "base64_encode", "base64_decode",
    "time", "date", "strtotime", "mktime",
    "rand", "mt_rand", "shuffle", "array_merge", "array_keys",
    "array_values", "array_filter", "array_map", "sort",
    "var_dump", "print_r", "die", "exit", "echo", "print",
    "include", "require", "include_once", "require_once",
    "defined", "define", "constant", "get_class", "is_array",
    "is_string", "is_numeric", "is_null", "is_object",
    "call_user_func", "call_user_func_array", "func_get_args",
    // Laravel helpers
    "config", "env", "app", "view", "route", "url",
    "asset", "redirect", "back", "old", "session",
    "auth", "bcrypt", "collect", "dd", "dump",
    // Control structures and keywords
    "if", "else", "elseif", "endif", "for", "foreach",
    "while", "do", "switch", "case", "default",
    "try", "catch", "finally", "throw", "return",
];

pub const PHP_EXTENSIONS: &[&str] = &["php", "phtml", "php3", "php4", "php5"];

const PHP_RULES: RuleSource = RuleSource {
    namespace: r"^\s*namespace\s+(?P<name>[A-Za-z_\\][A-Za-z0-9_\\]*)\s*;",
    import: r"^\s*use\s+(?P<path>[A-Za-z_\\][A-Za-z0-9_\\]*)\s*(?:as\s+(?P<alias>[A-Za-z_][A-Za-z0-9_]*))?\s*;",
    class: r"^\s*(?P<modifiers>(?:(?:abstract|final|readonly)\s+)*)(?:class|interface|trait|enum)\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?:\s+extends\s+[A-Za-z_\\][A-Za-z0-9_\\]*)?(?:\s+implements\s+[A-Za-z0-9_\\,\s]+)?",
    method: r"^\s*(?P<modifiers>(?:(?:public|private|protected|static|abstract|final)\s+)*)function\s+&?\s*(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*\((?P<params>[^)]*)(?:\)\s*(?::\s*(?P<ret>\??[A-Za-z_\\][A-Za-z0-9_\\|]*))?)?",
    function: r"^\s*function\s+&?\s*(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*\((?P<params>[^)]*)(?:\)\s*(?::\s*(?P<ret>\??[A-Za-z_\\][A-Za-z0-9_\\|]*))?)?",
    property: r"^\s*(?P<visibility>public|private|protected|var)\s+(?P<modifiers>(?:(?:static|readonly)\s+)*)(?:\??[A-Za-z_\\][A-Za-z0-9_\\|]*\s+)?\$(?P<name>[A-Za-z_][A-Za-z0-9_]*)",
    constant: r"^\s*(?:final\s+)?(?:(?P<visibility>public|private|protected)\s+)?(?:final\s+)?const\s+(?:[A-Za-z_\\][A-Za-z0-9_\\]*\s+)?(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*=",
    static_call: r"(?P<class>[A-Za-z_][A-Za-z0-9_]*)::(?P<member>\$?[A-Za-z_][A-Za-z0-9_]*)",
    member_call: r"\$[A-Za-z_][A-Za-z0-9_]*->(?P<member>\$?[A-Za-z_][A-Za-z0-9_]*)",
    instantiation: r"\bnew\s+(?P<class>[A-Za-z_\\][A-Za-z0-9_\\]*)",
    function_call: r"\b(?P<name>[a-zA-Z_][a-zA-Z0-9_]*)\s*\(",
    comment_prefixes: &["//", "#", "/*", "*"],
    param_sigil: '$',
    member_operators: &["->", "::"],
    instantiation_keyword: "new",
    closure_keywords: &["function", "fn"],
    declaration_keywords: &["function", "class"],
    builtins: PHP_BUILTINS,
};

static RULES: OnceLock<PatternRules> = OnceLock::new();

/// Compiled PHP rule table, shared by every parser instance
pub fn php_rules() -> &'static PatternRules {
    RULES.get_or_init(|| PatternRules::compile(&PHP_RULES).expect("valid regex"))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PhpParser;

impl PhpParser {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageParser for PhpParser {
    fn language(&self) -> &'static str {
        "php"
    }

    fn extensions(&self) -> &'static [&'static str] {
        PHP_EXTENSIONS
    }

    fn rules(&self) -> &PatternRules {
        php_rules()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeclarationKind, ParsedFile, UsageKind, Visibility};
    use std::path::Path;

    fn parse(code: &str) -> ParsedFile {
        PhpParser::new().parse_source(code, Path::new("/src/Test.php"), "Test.php")
    }

    #[test]
    fn test_language_and_extensions() {
        let parser = PhpParser::new();
        assert_eq!(parser.language(), "php");
        assert_eq!(
            parser.extensions(),
            &["php", "phtml", "php3", "php4", "php5"]
        );
    }

    #[test]
    fn test_builtin_table_is_complete() {
        assert_eq!(PHP_BUILTINS.len(), 101);
        assert!(php_rules().is_builtin("Array_Map"));
        assert!(php_rules().is_builtin("foreach"));
        assert!(!php_rules().is_builtin("format_phone"));
    }

    #[test]
    fn test_class_and_members() {
        let parsed = parse(
            r#"<?php
namespace App\Models;
use App\Services\Mailer;

abstract class User {
    private static $instances = [];
    public function __construct() {}
    public static function create($data): self {}
    const STATUS_ACTIVE = 'active';
}
"#,
        );

        assert_eq!(parsed.namespace, "App\\Models");
        assert_eq!(parsed.imports.len(), 1);
        assert_eq!(parsed.imports[0].path, "App\\Services\\Mailer");
        assert_eq!(parsed.imports[0].line, 3);

        let class = &parsed.declarations[0];
        assert_eq!(class.kind, DeclarationKind::Class);
        assert_eq!(class.name, "User");
        assert!(class.is_abstract);
        assert_eq!(class.line, 5);

        let property = parsed
            .declarations
            .iter()
            .find(|d| d.kind == DeclarationKind::Property)
            .unwrap();
        assert_eq!(property.name, "instances");
        assert!(property.is_static);
        assert_eq!(property.visibility, Some(Visibility::Private));
        assert_eq!(property.owning_class.as_deref(), Some("User"));

        let create = parsed
            .declarations
            .iter()
            .find(|d| d.name == "create")
            .unwrap();
        assert_eq!(create.kind, DeclarationKind::Method);
        assert!(create.is_static);
        assert_eq!(create.visibility, Some(Visibility::Public));
        assert_eq!(create.return_type.as_deref(), Some("self"));
        assert_eq!(create.parameters, vec!["data".to_string()]);

        let constant = parsed
            .declarations
            .iter()
            .find(|d| d.kind == DeclarationKind::Constant)
            .unwrap();
        assert_eq!(constant.name, "STATUS_ACTIVE");
        assert_eq!(constant.owning_class.as_deref(), Some("User"));
    }

    #[test]
    fn test_function_and_usages() {
        let parsed = parse(
            r#"<?php
function format_phone($num) { return $num; }
$user = new User();
$user->getName();
format_phone("123");
"#,
        );

        let func = &parsed.declarations[0];
        assert_eq!(func.kind, DeclarationKind::Function);
        assert_eq!(func.name, "format_phone");
        assert_eq!(func.parameters, vec!["num".to_string()]);

        let kinds: Vec<(UsageKind, &str)> = parsed
            .usages
            .iter()
            .map(|u| (u.kind, u.name.as_str()))
            .collect();
        assert!(kinds.contains(&(UsageKind::Instantiation, "User")));
        assert!(kinds.contains(&(UsageKind::MethodCall, "getName")));
        assert!(kinds.contains(&(UsageKind::FunctionCall, "format_phone")));
        // The instantiated class is not also reported as a call
        assert!(!kinds.contains(&(UsageKind::FunctionCall, "User")));
        // The declaring line does not call itself
        assert_eq!(
            kinds
                .iter()
                .filter(|(k, n)| *k == UsageKind::FunctionCall && *n == "format_phone")
                .count(),
            1
        );
    }

    #[test]
    fn test_complex_controller() {
        let parsed = parse(
            r#"<?php
namespace App\Http\Controllers;

use Illuminate\Http\Request;
use App\Services\UserService as Users;

class UserController extends Controller implements UserInterface {
    private $userService;
    protected static $cache = [];
    private ?Logger $logger = null;

    public function __construct(UserService $userService) {
        $this->userService = $userService;
    }

    public function index(Request $request): JsonResponse {
        $users = User::all();
        return response()->json($users);
    }

    final protected static function helper(int $a, $b = 5, ...$rest): ?array {
        return format_rows($a);
    }

    abstract public function render();
}
"#,
        );

        assert_eq!(parsed.imports[1].alias.as_deref(), Some("Users"));

        let names: Vec<(&str, DeclarationKind)> = parsed
            .declarations
            .iter()
            .map(|d| (d.name.as_str(), d.kind))
            .collect();
        assert!(names.contains(&("UserController", DeclarationKind::Class)));
        assert!(names.contains(&("userService", DeclarationKind::Property)));
        assert!(names.contains(&("cache", DeclarationKind::Property)));
        assert!(names.contains(&("logger", DeclarationKind::Property)));
        assert!(names.contains(&("__construct", DeclarationKind::Method)));
        assert!(names.contains(&("index", DeclarationKind::Method)));

        let helper = parsed
            .declarations
            .iter()
            .find(|d| d.name == "helper")
            .unwrap();
        assert!(helper.is_static);
        assert_eq!(helper.visibility, Some(Visibility::Protected));
        assert_eq!(helper.return_type.as_deref(), Some("?array"));
        assert_eq!(
            helper.parameters,
            vec!["a".to_string(), "b".to_string(), "rest".to_string()]
        );

        let render = parsed
            .declarations
            .iter()
            .find(|d| d.name == "render")
            .unwrap();
        assert!(render.is_abstract);

        let static_call = parsed
            .usages
            .iter()
            .find(|u| u.kind == UsageKind::StaticCall)
            .unwrap();
        assert_eq!(static_call.name, "User::all");
        assert_eq!(static_call.context, "index");

        let call = parsed
            .usages
            .iter()
            .find(|u| u.kind == UsageKind::FunctionCall)
            .unwrap();
        assert_eq!(call.name, "format_rows");
        assert_eq!(call.context, "helper");
    }

    #[test]
    fn test_weird_spacing_and_return_type() {
        let parsed = parse(
            "<?php\nclass A {\n    public function weirdSpacing   (  $param  )   :   string {\n    }\n}\n",
        );
        let method = &parsed.declarations[1];
        assert_eq!(method.name, "weirdSpacing");
        assert_eq!(method.parameters, vec!["param".to_string()]);
        assert_eq!(method.return_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_multiline_signature_still_declares() {
        let parsed = parse(
            "<?php\nclass A {\n    public function __construct(\n        Mailer $mailer,\n    ) {\n    }\n}\n",
        );
        let ctor = parsed
            .declarations
            .iter()
            .find(|d| d.kind == DeclarationKind::Method)
            .unwrap();
        assert_eq!(ctor.name, "__construct");
        assert!(ctor.parameters.is_empty());
    }

    #[test]
    fn test_comments_and_builtins_are_ignored() {
        let parsed = parse(
            r#"<?php
// helper_one();
# helper_two();
/* helper_three(); */
/**
 * @see helper_four()
 */
function wrap($items) {
    $n = count($items);
    if ($n > 0) {
        foreach ($items as $item) {
            echo strtoupper($item);
        }
    }
    $cb = function ($x) { return $x; };
    $fn = fn($x) => $x;
}
"#,
        );
        let calls: Vec<&str> = parsed
            .usages
            .iter()
            .filter(|u| u.kind == UsageKind::FunctionCall)
            .map(|u| u.name.as_str())
            .collect();
        assert!(calls.is_empty(), "unexpected calls: {:?}", calls);
    }

    #[test]
    fn test_calls_suppressed_on_member_access_lines() {
        let parsed = parse("<?php\nfunction f() {\n    $a->run(local_helper());\n}\n");
        assert!(!parsed
            .usages
            .iter()
            .any(|u| u.kind == UsageKind::FunctionCall));
        assert!(parsed
            .usages
            .iter()
            .any(|u| u.kind == UsageKind::MethodCall && u.name == "run"));
    }

    #[test]
    fn test_first_namespace_wins() {
        let parsed = parse("<?php\nnamespace First;\nnamespace Second;\nclass A {}\n");
        assert_eq!(parsed.namespace, "First");
        assert_eq!(parsed.declarations[0].namespace, "First");
    }

    #[test]
    fn test_interfaces_traits_and_constants() {
        let parsed = parse(
            r#"<?php
interface Repository {
    public function find($id);
}
trait Loggable {
    protected const LEVEL = 'debug';
}
final class Config {
    public const DEFAULT_ROLE = 'user';
    private const int MAX = 5;
}
const GLOBAL_FLAG = true;
"#,
        );
        let classes: Vec<&str> = parsed
            .declarations
            .iter()
            .filter(|d| d.kind == DeclarationKind::Class)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(classes, vec!["Repository", "Loggable", "Config"]);

        let constants: Vec<(&str, Option<Visibility>, Option<&str>)> = parsed
            .declarations
            .iter()
            .filter(|d| d.kind == DeclarationKind::Constant)
            .map(|d| (d.name.as_str(), d.visibility, d.owning_class.as_deref()))
            .collect();
        assert_eq!(
            constants,
            vec![
                ("LEVEL", Some(Visibility::Protected), Some("Loggable")),
                ("DEFAULT_ROLE", Some(Visibility::Public), Some("Config")),
                ("MAX", Some(Visibility::Private), Some("Config")),
                ("GLOBAL_FLAG", Some(Visibility::Public), None),
            ]
        );
    }

    #[test]
    fn test_qualified_instantiation() {
        let parsed = parse("<?php\nfunction make() {\n    return new \\App\\Models\\User();\n}\n");
        let usages: Vec<(UsageKind, &str)> = parsed
            .usages
            .iter()
            .map(|u| (u.kind, u.name.as_str()))
            .collect();
        assert_eq!(usages, vec![(UsageKind::Instantiation, "\\App\\Models\\User")]);
    }
}
