//! User-facing message texts and button labels.
//!
//! The bot speaks German to its users; everything a user or admin ever sees
//! is collected here so the wording can be reviewed in one place. Dynamic
//! parts (formats, counts, titles) are spliced in at the call sites.

// Icons used throughout the rendered messages.

pub const ICON_ANNOUNCEMENT: &str = "📣";
pub const ICON_LOCATION: &str = "📍";
pub const ICON_DATE: &str = "📅";
pub const ICON_CATEGORY: &str = "🏷";
pub const ICON_DESCRIPTION: &str = "📝";
pub const ICON_LINKS: &str = "🔗";
pub const ICON_SEARCH: &str = "🔍";
pub const ICON_APPROVE: &str = "✅";
pub const ICON_REJECT: &str = "❌";
pub const ICON_RESET: &str = "🔄";
pub const ICON_EDIT: &str = "✏️";

// Command entry points.

pub const SUBMIT_INTRO: &str = "Möchtest du eine Veranstaltung einreichen?";
pub const SEARCH_INTRO: &str = "Möchtest du nach Veranstaltungen suchen?";
pub const HELP: &str = "Verfügbare Befehle:\n/submit - Veranstaltung einreichen\n/search - Veranstaltungen suchen\n/edit - Eigene Veranstaltung bearbeiten";
pub const EDIT_INTRO: &str = "Möchtest du eine deiner Veranstaltungen bearbeiten?";
pub const YES: &str = "Ja";
pub const NO: &str = "Nein";

// Submission workflow.

pub const ASK_TITLE: &str = "Bitte gib den Titel der Veranstaltung ein (max. 65 Zeichen):";
pub const TITLE_TOO_LONG: &str = "Der Titel darf maximal 65 Zeichen lang sein!";
pub const ASK_DESCRIPTION: &str = "Bitte gib eine Beschreibung ein (max. 600 Zeichen):";
pub const DESCRIPTION_TOO_LONG: &str = "Die Beschreibung darf maximal 600 Zeichen lang sein!";
pub const ASK_LOCATION: &str = "Bitte gib die Location ein (mindestens 3 Zeichen):";
pub const LOCATION_TOO_SHORT: &str = "Die Location muss mindestens 3 Zeichen lang sein!";
pub const INVALID_START_DATE: &str = "Ungültiges Startdatum! Bitte verwende das angegebene Format.";
pub const INVALID_END_DATE: &str = "Ungültiges Enddatum oder Enddatum liegt nicht nach dem Startdatum!";
pub const START_AFTER_END: &str = "Das Startdatum muss vor dem Enddatum liegen!";
pub const CONFIRM_DATES: &str = "Bestätigen";
pub const RESET_DATES: &str = "Neu eingeben";
pub const DATES_SAVED: &str = "Termine gespeichert!";
pub const DATES_RESET: &str = "Eingabe zurückgesetzt!";
pub const ASK_CATEGORY: &str = "Bitte wähle eine Kategorie aus:";
pub const CATEGORY_DONE: &str = "Fertig";
pub const CATEGORY_RESET: &str = "Reset";
pub const CATEGORIES_SAVED: &str = "Kategorien gespeichert!";
pub const CATEGORIES_CLEARED: &str = "Kategorien zurückgesetzt!";
pub const CATEGORIES_CLEARED_PROMPT: &str = "Kategorieauswahl wurde zurückgesetzt. Bitte wähle erneut.";
pub const CATEGORY_REQUIRED: &str = "Bitte mindestens eine Kategorie wählen!";
pub const ASK_LINKS: &str = "Bitte gib bis zu 2 Links ein, getrennt durch Leerzeichen (oder schreibe \"no\" für keine Links):";
pub const ASK_IMAGE: &str = "Bitte sende ein Bild für die Veranstaltung oder schreibe \"no\" für kein Bild:";
pub const IMAGE_DOWNLOAD_FAILED: &str = "Fehler beim Herunterladen des Bildes.";
pub const IMAGE_INVALID: &str = "Ungültige Eingabe. Bitte sende ein Bild oder schreibe \"no\" für kein Bild.";
pub const SUBMISSION_RECEIVED: &str = "Danke! Deine Veranstaltung wurde zur Überprüfung an die Admins gesendet.";
pub const SUBMISSION_INVALID: &str = "Deine Eingaben sind ungültig. Die Einreichung wurde abgebrochen.";

// Review / admin side.

pub const BUTTON_APPROVE: &str = "Annehmen";
pub const BUTTON_REJECT: &str = "Ablehnen";
pub const EVENT_NOT_FOUND: &str = "Veranstaltung nicht gefunden.";
pub const EVENT_ALREADY_PUBLISHED: &str = "Veranstaltung wurde bereits veröffentlicht.";
pub const EVENT_UNKNOWN_STATUS: &str = "Unbekannter Status der Veranstaltung.";
pub const EVENT_PUBLISHED: &str = "Veranstaltung wurde veröffentlicht.";
pub const PUBLISH_FAILED: &str = "Fehler beim Veröffentlichen der Veranstaltung.";
pub const ASK_REJECTION_REASON: &str = "Bitte gib den Grund für die Ablehnung ein:";
pub const REJECTION_DONE: &str = "Veranstaltung wurde abgelehnt und der Grund wurde dem Nutzer mitgeteilt.";
pub const REJECTION_FAILED: &str = "Fehler beim Ablehnen der Veranstaltung.";

// Edit workflow.

pub const NO_EDITABLE_EVENTS: &str = "Du hast keine genehmigten Veranstaltungen in der Zukunft zur Bearbeitung.";
pub const CHOOSE_EVENT_TO_EDIT: &str = "Wähle die Veranstaltung, die du bearbeiten möchtest:";
pub const CURRENT_EVENT_CONTENT: &str = "Aktueller Inhalt der Veranstaltung:";
pub const EDIT_SUMMARY: &str = "Zusammenfassung der Änderungen:";
pub const ASK_SAVE_CHANGES: &str = "Möchtest du die Änderungen speichern?";
pub const NO_CHANGES: &str = "Keine Änderungen vorgenommen.";
pub const CHANGES_SAVED: &str = "Deine Änderungen wurden gespeichert und zur Überprüfung an die Admins gesendet.";
pub const CHANGES_DISCARDED: &str = "Änderungen wurden verworfen.";
pub const CHANGES_INVALID: &str = "Die Änderungen sind ungültig und wurden nicht gespeichert.";
pub const EDIT_NOT_POSSIBLE: &str = "Die Veranstaltung kann derzeit nicht bearbeitet werden.";

// Search workflow.

pub const CHOOSE_SEARCH_OPTION: &str = "Wähle eine Suchoption:";
pub const SEARCH_TODAY: &str = "Heute";
pub const SEARCH_TOMORROW: &str = "Morgen";
pub const SEARCH_SPECIFIC: &str = "Datum wählen";
pub const SEARCH_EXIT: &str = "Beenden";
pub const SEARCH_START: &str = "Suche starten";
pub const SEARCH_ENDED: &str = "Suche beendet!";
pub const SEARCH_FINISHED: &str = "Suche abgeschlossen. Du kannst eine neue Suche starten, indem du den Befehl erneut ausführst.";
pub const INVALID_SEARCH_DATE: &str = "Ungültiges Datumsformat! Bitte verwende das angegebene Format.";
