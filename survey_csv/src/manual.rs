/*!

This is the long-form manual for `survey_csv` and `sdapscsv`.

## Row format

A CSV file holds one header row followed by one row per scanned sheet.
All values are strings: integers are written in decimal, text in UTF-8.

The first two columns are always present and always filled:

| column             | content                                             |
|--------------------|-----------------------------------------------------|
| `questionnaire_id` | the id printed on the sheet, used to find it again  |
| `global_id`        | the id of the sheet within the survey               |

The other columns follow the questionnaire, in the order of its question
objects and then in the order of the boxes inside each question. Their
names are derived from the ids of the nodes: the id `(2, 1, 3)` becomes
`2_1_3`. They never depend on the position of the node in the file, so a
column keeps its name when other questions are added.

### Question objects

| kind              | columns                                  | value                              |
|-------------------|------------------------------------------|------------------------------------|
| `head`            | none                                     |                                    |
| `choice`          | `<id>_image` (optional), then its boxes  |                                    |
| `text`            | `<id>_image` (optional), then its boxes  |                                    |
| `option`          | `<id>`                                   | the selected index                 |
| `additional_mark` | `<id>`                                   | the integer answer                 |

### Boxes

| kind       | columns                                 | value                                   |
|------------|-----------------------------------------|-----------------------------------------|
| `checkbox` | `<id>`, `<id>_quality` (optional)       | the state (`0` unmarked, `1` marked), the recognition quality |
| `textbox`  | `<id>`                                  | see below                               |

A text box exports, in this order of preference:
1. the recognized text, if the box is marked and some text was recognized,
2. an image of the box, if the box is marked and images are exported,
3. its state.

On import, an integer sets the state and clears the text. Anything else is
stored as the text of the box, which is then considered marked.

### Optional columns

- `--quality` adds one `<id>_quality` column after every checkbox. Text
  boxes and options are not affected.
- `--question-images` adds one `<id>_image` column in front of the boxes of
  every choice and text question. The cell names the image of all the boxes
  of the question. It is left empty when no box of the question is marked.
- `--images` replaces the state of marked text boxes without recognized
  text by the name of their image.

A column that is disabled is left out of the file. It is never written
empty.

## Import

Each row is matched to a sheet through its `questionnaire_id`. Rows that
match no sheet are skipped: a file may contain the sheets of several
questionnaires. Pass `--warn-unknown-sheets` to have them reported.

Only the columns present in a row are read. Missing columns leave the
corresponding boxes as they were. Columns that only accept integers
(checkbox states, options, additional marks) reject any other content. In
that case, the whole row is rejected, the sheet is left unchanged and the
import stops with the line number of the row.

The `global_id` and the `_quality` and `_image` columns are never imported.

## Input formats

* `csv` Comma Separated Values, with a header row. Another delimiter can be
  chosen with `--delimiter`.
* `xlsx` Excel spreadsheets, with a header row. The first worksheet is used
  unless `--excel-worksheet-name` is given. Empty cells are treated as
  missing columns.

*/
