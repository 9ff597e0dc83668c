//! Constantes del motor de adaptación y ejecución de secuencias.
//!
//! Algunos de estos valores participan en el fingerprint de una secuencia
//! (`ENGINE_VERSION`), otros definen la notación de las hojas de estímulos y
//! los marcadores usados al serializar registros de ejecución.

/// Versión lógica del motor. Forma parte del input del fingerprint de una
/// `SequenceSpecification`: cambiarla invalida los fingerprints previos.
pub const ENGINE_VERSION: &str = "A1.0";

/// Nombre reservado para el inicializador (constructor) de una interfaz.
pub const INITIALIZER_NAME: &str = "<init>";

/// Tipo raíz de la jerarquía de referencias.
pub const OBJECT_TYPE: &str = "java.lang.Object";

/// Tipo de cadena.
pub const STRING_TYPE: &str = "java.lang.String";

/// Operación de hoja que crea una instancia.
pub const OP_CREATE: &str = "create";

/// Operación de hoja que evalúa una expresión embebida.
pub const OP_EVAL: &str = "$eval";

/// Operación de hoja que accede a un campo concreto del artifact.
pub const OP_FIELD: &str = "$field";

/// Marcadores usados en los reportes de ejecución.
pub const MARK_INSTANCE: &str = "_INSTANCE_";
pub const MARK_EXCEPTION: &str = "_EXCEPTION_";
pub const MARK_ENGINE_ERROR: &str = "_ENGINE_ERROR_";
pub const MARK_NOT_EXECUTED: &str = "_NOT_EXECUTED_";
pub const MARK_NO_ORACLE: &str = "_NA_";

/// Límite por defecto de variantes enumeradas por `SignatureMatching`.
pub const DEFAULT_ADAPTER_LIMIT: usize = 5;
