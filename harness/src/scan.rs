//! Static completeness scan over the application's source tree.
//!
//! This is a config/manifest-presence checklist, not a behavioral test:
//! a rule list of (file path, requirements) evaluated independently by
//! literal substring and JSON-key matching. A missing file produces a
//! failure record; it never aborts the run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::recorder::CheckRecorder;

/// Root of the application source tree the default rules scan.
pub const APP_SOURCE_ROOT: &str = "app";

/// One requirement evaluated against a file's contents.
pub enum ScanCheck {
    /// Every needle must appear in the file; produces one record.
    RequireAll { label: String, needles: Vec<String> },
    /// Each group is satisfied by any one of its alternatives; groups
    /// with no satisfied alternative are reported as missing. Produces
    /// one record.
    RequireAnyGroups {
        label: String,
        groups: Vec<(String, Vec<String>)>,
    },
    /// Parse the file as JSON and require each package key under the
    /// given section; produces one record per package.
    ManifestPackages {
        section: String,
        packages: Vec<(String, String)>,
    },
}

/// All requirements attached to one file.
pub struct ScanRule {
    pub name: String,
    pub path: PathBuf,
    pub checks: Vec<ScanCheck>,
}

/// Evaluates every rule, appending one or more records per rule.
pub fn run_scan(rules: &[ScanRule], rec: &mut CheckRecorder) {
    log::info!("=== Static source scan ===");
    for rule in rules {
        apply_rule(rule, rec);
    }
}

fn apply_rule(rule: &ScanRule, rec: &mut CheckRecorder) {
    let content = match fs::read_to_string(&rule.path) {
        Ok(content) => content,
        Err(err) => {
            log::warn!("Cannot read {}: {}", rule.path.display(), err);
            rec.record(
                &format!("{} File", rule.name),
                false,
                &format!("File not found: {}", rule.path.display()),
            );
            return;
        }
    };

    for check in &rule.checks {
        match check {
            ScanCheck::RequireAll { label, needles } => {
                let missing: Vec<&str> = needles
                    .iter()
                    .filter(|needle| !content.contains(needle.as_str()))
                    .map(String::as_str)
                    .collect();
                if missing.is_empty() {
                    rec.record(label, true, "All required entries found");
                } else {
                    rec.record(label, false, &format!("Missing entries: {:?}", missing));
                }
            }
            ScanCheck::RequireAnyGroups { label, groups } => {
                let missing: Vec<&str> = groups
                    .iter()
                    .filter(|(_, alternatives)| {
                        !alternatives.iter().any(|alt| content.contains(alt.as_str()))
                    })
                    .map(|(display, _)| display.as_str())
                    .collect();
                if missing.is_empty() {
                    rec.record(label, true, "All required entries found");
                } else {
                    rec.record(label, false, &format!("Missing entries: {:?}", missing));
                }
            }
            ScanCheck::ManifestPackages { section, packages } => {
                apply_manifest_check(rule, &content, section, packages, rec);
            }
        }
    }
}

fn apply_manifest_check(
    rule: &ScanRule,
    content: &str,
    section: &str,
    packages: &[(String, String)],
    rec: &mut CheckRecorder,
) {
    let manifest: serde_json::Value = match serde_json::from_str(content) {
        Ok(manifest) => manifest,
        Err(err) => {
            rec.record(
                &format!("{} Manifest", rule.name),
                false,
                &format!("Invalid JSON in {}: {}", rule.path.display(), err),
            );
            return;
        }
    };

    let dependencies = manifest.get(section).cloned().unwrap_or_default();
    for (package, description) in packages {
        let label = format!("{} Package", description);
        match dependencies.get(package).and_then(|v| v.as_str()) {
            Some(version) => rec.record(
                &label,
                true,
                &format!("Installed: {}@{}", package, version),
            ),
            None => rec.record(&label, false, &format!("Missing: {}", package)),
        }
    }
}

fn all(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Export check: satisfied by either a class or a const export.
fn export_group(name: &str) -> (String, Vec<String>) {
    (
        name.to_string(),
        vec![
            format!("export class {}", name),
            format!("export const {}", name),
        ],
    )
}

/// Helper-function check: satisfied by an exported or plain const binding.
fn function_group(name: &str) -> (String, Vec<String>) {
    (
        name.to_string(),
        vec![format!("export const {}", name), format!("const {}", name)],
    )
}

/// The audit's full checklist over the application source tree rooted at
/// `root`: platform configuration, dependency manifest, service modules,
/// helper utilities, and per-service business-logic methods.
pub fn default_rules(root: &Path) -> Vec<ScanRule> {
    let mut rules = vec![
        ScanRule {
            name: "Firebase Config".to_string(),
            path: root.join("src/config/firebase.js"),
            checks: vec![
                ScanCheck::RequireAll {
                    label: "Firebase Imports".to_string(),
                    needles: all(&[
                        "@react-native-firebase/app",
                        "@react-native-firebase/auth",
                        "@react-native-firebase/firestore",
                        "@react-native-firebase/functions",
                        "@react-native-google-signin/google-signin",
                    ]),
                },
                ScanCheck::RequireAll {
                    label: "Collections Definition".to_string(),
                    needles: all(&["collections = {"]),
                },
                ScanCheck::RequireAll {
                    label: "Google Sign-In Config".to_string(),
                    needles: all(&[
                        "439803992286-t0tv25oh59dumc53bhi3i5vm871doh20.apps.googleusercontent.com",
                    ]),
                },
            ],
        },
        ScanRule {
            name: "Package".to_string(),
            path: root.join("package.json"),
            checks: vec![ScanCheck::ManifestPackages {
                section: "dependencies".to_string(),
                packages: vec![
                    ("@react-native-firebase/app".to_string(), "Firebase Core".to_string()),
                    ("@react-native-firebase/auth".to_string(), "Firebase Authentication".to_string()),
                    ("@react-native-firebase/firestore".to_string(), "Firebase Firestore".to_string()),
                    ("@react-native-firebase/functions".to_string(), "Firebase Functions".to_string()),
                    ("@react-native-google-signin/google-signin".to_string(), "Google Sign-In".to_string()),
                    ("@invertase/react-native-apple-authentication".to_string(), "Apple Sign-In".to_string()),
                ],
            }],
        },
        ScanRule {
            name: "Helpers".to_string(),
            path: root.join("src/utils/helpers.js"),
            checks: vec![
                ScanCheck::RequireAnyGroups {
                    label: "Helper Functions".to_string(),
                    groups: vec![
                        function_group("generateReferralCode"),
                        function_group("formatTime"),
                        function_group("getCurrentDateString"),
                        function_group("creditsToTime"),
                        function_group("timeToCredits"),
                    ],
                },
                ScanCheck::RequireAll {
                    label: "Package Configurations".to_string(),
                    needles: all(&["CREDIT_PACKAGES", "PREMIUM_PACKAGES"]),
                },
            ],
        },
    ];

    // service modules: export shape plus platform integration
    let services = [
        ("src/services/UserService.js", "UserService"),
        ("src/services/ChatService.js", "ChatService"),
        ("src/services/MatchmakingService.js", "MatchmakingService"),
        ("src/services/AuthService.js", "AuthService"),
        ("src/context/AuthContext.js", "AuthContext"),
    ];
    for (path, service) in services {
        rules.push(ScanRule {
            name: service.to_string(),
            path: root.join(path),
            checks: vec![
                ScanCheck::RequireAnyGroups {
                    label: format!("{} Implementation", service),
                    groups: vec![export_group(service)],
                },
                ScanCheck::RequireAll {
                    label: format!("{} Firebase Integration", service),
                    needles: all(&["@react-native-firebase"]),
                },
            ],
        });
    }

    // per-service required business-logic methods
    let method_sets = [
        ("src/services/UserService.js", "UserService", vec![
            "checkAndResetDailyTimer",
            "updateDailyTimeUsed",
            "useCredits",
            "purchaseCredits",
            "upgradeToPremium",
            "getUserStats",
            "updateUserStats",
        ]),
        ("src/services/ChatService.js", "ChatService", vec![
            "createChat",
            "sendMessage",
            "endChat",
            "ratePartner",
            "blockUser",
            "reportUser",
            "getChatHistory",
        ]),
        ("src/services/MatchmakingService.js", "MatchmakingService", vec![
            "findPartner",
            "findMatch",
            "getRecentPartners",
            "removeFromQueue",
            "cancelMatching",
        ]),
    ];
    for (path, service, methods) in method_sets {
        rules.push(ScanRule {
            name: format!("{} Business Logic", service),
            path: root.join(path),
            checks: vec![ScanCheck::RequireAll {
                label: format!("{} Methods", service),
                needles: methods
                    .iter()
                    .map(|method| format!("static async {}", method))
                    .collect(),
            }],
        });
    }

    rules
}
