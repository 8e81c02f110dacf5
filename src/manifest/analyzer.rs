use once_cell::sync::Lazy;
use regex::Regex;

static PACKAGE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"package\s*=\s*"([^"]+)""#).unwrap());
static APPLICATION_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<application[^>]*android:name\s*=\s*"([^"]+)""#).unwrap());
static ACTIVITY_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<activity[^>]*android:name\s*=\s*"([^"]+)"[^>]*>(.*?)</activity>"#).unwrap()
});

const ACTION_MAIN: &str = "android.intent.action.MAIN";
const CATEGORY_LAUNCHER: &str = "android.intent.category.LAUNCHER";

/// Names extracted from decoded manifest text. All fields are optional;
/// absence is a legal manifest shape, not a failure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManifestInfo {
    pub package_name: Option<String>,
    pub application_class: Option<String>,
    pub launch_activity: Option<String>,
}

/// Extracts package name, application class and launch activity from
/// decoded manifest text.
///
/// Matching is deliberately textual, not structural: first attribute match
/// wins, and the launch activity is the first `<activity>` block whose body
/// contains both the MAIN action and LAUNCHER category as plain substrings.
pub fn analyze(xml: &str) -> ManifestInfo {
    let package_name = PACKAGE_NAME.captures(xml).map(|c| c[1].to_string());
    let application_class = APPLICATION_CLASS.captures(xml).map(|c| c[1].to_string());
    let launch_activity = find_launch_activity(xml, package_name.as_deref());
    ManifestInfo {
        package_name,
        application_class,
        launch_activity,
    }
}

fn find_launch_activity(xml: &str, package_name: Option<&str>) -> Option<String> {
    for caps in ACTIVITY_BLOCK.captures_iter(xml) {
        let body = &caps[2];
        if !body.contains(ACTION_MAIN) || !body.contains(CATEGORY_LAUNCHER) {
            continue;
        }
        let name = &caps[1];
        // Relative names resolve against the package attribute; without one
        // the dotted name is returned with an empty prefix.
        return Some(if name.starts_with('.') {
            format!("{}{}", package_name.unwrap_or(""), name)
        } else {
            name.to_string()
        });
    }
    None
}
